// src/services/report_service.rs

use chrono::{DateTime, Duration, Utc};
use genpdf::{elements, style, Element};
use image::{DynamicImage, Luma};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use qrcode::QrCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::VisitRepository,
    models::visit::{MediaType, VisitDetail, VisitReport, VisitStatus},
    services::{
        scope::{area_filter, AccessScope},
        storage::{decode_data_uri, MediaStorage},
    },
};

// Propósito do token público: o mesmo segredo assina outros tokens no
// futuro, então o informe público tem a própria audiência.
const PUBLIC_REPORT_AUDIENCE: &str = "trust:visit-report-public";
const TOKEN_MAX_AGE_DAYS: i64 = 30;

// Limite do informe: até 4 miniaturas de foto em grade de 2 colunas
const MAX_REPORT_PHOTOS: usize = 4;

#[derive(Debug, Serialize, Deserialize)]
struct PublicReportClaims {
    sub: Uuid,
    aud: String,
    exp: usize,
    iat: usize,
}

// Enlace público emitido para uma visita finalizada
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicLink {
    pub url: String,
    pub token: String,
    pub expires_in_days: i64,
}

// A seção de mapa degrada em dois níveis: sem coordenadas e com
// coordenadas mas sem mapa (a falha do fetch nunca aborta o informe).
enum MapSection {
    Image(DynamicImage),
    NoCoordinates,
    Unavailable,
}

#[derive(Clone)]
pub struct ReportService {
    visit_repo: VisitRepository,
    storage: MediaStorage,
    http_client: reqwest::Client,
    jwt_secret: String,
    public_base_url: String,
    static_map_base_url: String,
}

impl ReportService {
    pub fn new(
        visit_repo: VisitRepository,
        storage: MediaStorage,
        http_client: reqwest::Client,
        jwt_secret: String,
        public_base_url: String,
        static_map_base_url: String,
    ) -> Self {
        Self {
            visit_repo,
            storage,
            http_client,
            jwt_secret,
            public_base_url,
            static_map_base_url,
        }
    }

    // =========================================================================
    //  TOKEN PÚBLICO
    // =========================================================================

    pub fn issue_public_link(&self, visit: &VisitDetail) -> Result<PublicLink, AppError> {
        if visit.status != VisitStatus::Completed {
            return Err(AppError::validation(
                "El informe solo está disponible para visitas finalizadas.",
            ));
        }

        let token = encode_public_token(&self.jwt_secret, visit.id, Utc::now())?;
        Ok(PublicLink {
            url: format!("{}/api/visits/report/public/{token}", self.public_base_url),
            token,
            expires_in_days: TOKEN_MAX_AGE_DAYS,
        })
    }

    // Qualquer falha (assinatura, expiração, audiência, visita não
    // finalizada) resolve para NotFound, sem distinção que vaze informação.
    pub async fn resolve_public_visit(&self, token: &str) -> Result<VisitDetail, AppError> {
        let visit_id =
            decode_public_token(&self.jwt_secret, token).ok_or(AppError::NotFound)?;

        let mut visit = self
            .visit_repo
            .get(visit_id, None)
            .await?
            .ok_or(AppError::NotFound)?;

        if visit.status != VisitStatus::Completed {
            return Err(AppError::NotFound);
        }

        visit.media = self.visit_repo.list_media(visit.id).await?;
        Ok(visit)
    }

    // Releitura do get autenticado, com o escopo do chamador aplicado
    pub async fn visit_for_report(
        &self,
        visit_id: Uuid,
        scope: Option<&AccessScope>,
    ) -> Result<VisitDetail, AppError> {
        let mut visit = self
            .visit_repo
            .get(visit_id, area_filter(scope))
            .await?
            .ok_or(AppError::NotFound)?;
        visit.media = self.visit_repo.list_media(visit.id).await?;
        Ok(visit)
    }

    // =========================================================================
    //  RENDERIZAÇÃO
    // =========================================================================

    // Determinístico para o mesmo snapshot da visita e a mesma public_url;
    // o único elemento não determinístico é o carimbo "generado el".
    pub async fn render(
        &self,
        visit: &VisitDetail,
        public_url: Option<&str>,
    ) -> Result<Vec<u8>, AppError> {
        if visit.status != VisitStatus::Completed {
            return Err(AppError::validation(
                "El informe solo está disponible para visitas finalizadas.",
            ));
        }

        let report = visit
            .visit_report
            .as_ref()
            .and_then(|value| VisitReport::parse(value).ok())
            .unwrap_or_default();

        let map = self.load_map_section(visit).await;
        let photos = self.load_photos(visit).await;
        let signature = load_signature_image(&report);

        self.compose(visit, &report, map, &photos, signature, public_url)
    }

    // O fetch do mapa é a única chamada externa bloqueante do sistema:
    // tem timeout curto (no cliente HTTP) e falha suave.
    async fn load_map_section(&self, visit: &VisitDetail) -> MapSection {
        let coords = match (
            visit.start_latitude,
            visit.start_longitude,
            visit.end_latitude,
            visit.end_longitude,
        ) {
            (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
            _ => return MapSection::NoCoordinates,
        };

        match self.fetch_map(coords).await {
            Ok(image) => MapSection::Image(image),
            Err(err) => {
                tracing::warn!("No se pudo cargar el mapa estático: {err}");
                MapSection::Unavailable
            }
        }
    }

    async fn fetch_map(
        &self,
        (start_lat, start_lon, end_lat, end_lon): (f64, f64, f64, f64),
    ) -> Result<DynamicImage, anyhow::Error> {
        let center_lat = (start_lat + end_lat) / 2.0;
        let center_lon = (start_lon + end_lon) / 2.0;
        let url = format!(
            "{}/staticmap.php?center={center_lat},{center_lon}&zoom=16&size=640x320&markers={start_lat},{start_lon},lightblue1|{end_lat},{end_lon},red-pushpin",
            self.static_map_base_url
        );

        let bytes = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(image::load_from_memory(&bytes)?)
    }

    async fn load_photos(&self, visit: &VisitDetail) -> Vec<DynamicImage> {
        let mut photos = Vec::new();
        // Vídeos e 'other' ficam fora do PDF
        for media in visit
            .media
            .iter()
            .filter(|m| m.media_type == MediaType::Photo)
            .take(MAX_REPORT_PHOTOS)
        {
            match self.load_photo(&media.file_url).await {
                Ok(image) => photos.push(image),
                Err(err) => {
                    tracing::warn!("Evidencia ilegible '{}': {err}", media.file_url);
                }
            }
        }
        photos
    }

    async fn load_photo(&self, url: &str) -> Result<DynamicImage, AppError> {
        let bytes = self.storage.read_url(url).await?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| anyhow::anyhow!("Imagen inválida: {e}"))?;
        Ok(image.thumbnail(600, 450))
    }

    // Montagem síncrona do PDF: fluxo único de cartões empilhados em página
    // carta. O overflow quebra de página com o cabeçalho do decorador.
    fn compose(
        &self,
        visit: &VisitDetail,
        report: &VisitReport,
        map: MapSection,
        photos: &[DynamicImage],
        signature: Option<DynamicImage>,
        public_url: Option<&str>,
    ) -> Result<Vec<u8>, AppError> {
        // Carrega a fonte da pasta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|e| anyhow::anyhow!("Fuente no encontrada en ./fonts: {e}"))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Informe de visita {}", visit.id));
        doc.set_paper_size(genpdf::PaperSize::Letter);

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        // Cada página nova (inclusive as de overflow) repete o cabeçalho
        decorator.set_header(|_page| {
            let mut header = elements::LinearLayout::vertical();
            header.push(
                elements::Paragraph::new("TRUST - Mantenimiento de dosificadores")
                    .styled(style::Style::new().bold().with_font_size(11)),
            );
            header.push(elements::Break::new(1.0));
            header
        });
        doc.set_page_decorator(decorator);

        let bold = style::Style::new().bold();
        let section_title = style::Style::new().bold().with_font_size(12);

        // --- CABEÇALHO DO INFORME ---
        doc.push(
            elements::Paragraph::new("INFORME DE VISITA")
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        doc.push(
            elements::Paragraph::new(format!("Visita {} [{}]", visit.id, visit.status.label()))
                .styled(style::Style::new().with_font_size(10)),
        );
        doc.push(
            elements::Paragraph::new(format!(
                "Generado el {}",
                Utc::now().format("%d/%m/%Y %H:%M UTC")
            ))
            .styled(style::Style::new().italic().with_font_size(8)),
        );
        doc.push(elements::Break::new(1.5));

        // --- RESUMEN ---
        let mut table = elements::TableLayout::new(vec![1, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let rows: Vec<(&str, String)> = vec![
            ("Cliente", visit.client_name.clone()),
            ("Sucursal", visit.branch_name.clone()),
            ("Área", visit.area_name.clone()),
            (
                "Dosificador",
                visit
                    .dispenser_identifier
                    .clone()
                    .unwrap_or_else(|| "Sin asignar".to_string()),
            ),
            (
                "Inspector",
                visit
                    .inspector_name
                    .clone()
                    .unwrap_or_else(|| "Sin asignar".to_string()),
            ),
            (
                "Checklist",
                format!("{}/{} OK", report.passed_count(), report.checklist.len()),
            ),
        ];

        for (label, value) in rows {
            table
                .row()
                .element(elements::Paragraph::new(label).styled(bold))
                .element(elements::Paragraph::new(value))
                .push()
                .map_err(|e| anyhow::anyhow!("Error armando la tabla: {e}"))?;
        }
        doc.push(table);
        doc.push(elements::Break::new(1.5));

        // --- UBICACIÓN ---
        doc.push(elements::Paragraph::new("Ubicación").styled(section_title));
        match map {
            MapSection::Image(map_image) => {
                let element = elements::Image::from_dynamic_image(map_image)
                    .map_err(|e| anyhow::anyhow!("No se pudo incrustar el mapa: {e}"))?
                    .with_alignment(genpdf::Alignment::Center);
                doc.push(element);
            }
            MapSection::NoCoordinates => {
                doc.push(elements::Paragraph::new(
                    "La visita no tiene coordenadas registradas.",
                ));
            }
            MapSection::Unavailable => {
                doc.push(elements::Paragraph::new("El mapa no está disponible."));
            }
        }
        doc.push(elements::Break::new(1.5));

        // --- OBSERVACIONES ---
        if !report.comments.trim().is_empty() {
            doc.push(elements::Paragraph::new("Observaciones").styled(section_title));
            doc.push(elements::Paragraph::new(report.comments.clone()));
            doc.push(elements::Break::new(1.5));
        }

        // --- EVIDENCIAS (grade 2 colunas, só fotos) ---
        if !photos.is_empty() {
            doc.push(elements::Paragraph::new("Evidencias").styled(section_title));
            let mut grid = elements::TableLayout::new(vec![1, 1]);

            for pair in photos.chunks(2) {
                let mut row = grid.row();
                for photo in pair {
                    let element = elements::Image::from_dynamic_image(photo.clone())
                        .map_err(|e| anyhow::anyhow!("No se pudo incrustar la evidencia: {e}"))?
                        .with_alignment(genpdf::Alignment::Center);
                    row = row.element(element);
                }
                if pair.len() == 1 {
                    row = row.element(elements::Paragraph::new(""));
                }
                row.push()
                    .map_err(|e| anyhow::anyhow!("Error armando la grilla: {e}"))?;
            }
            doc.push(grid);
            doc.push(elements::Break::new(1.5));
        }

        // --- FIRMA ---
        doc.push(elements::Paragraph::new("Firma del responsable").styled(section_title));
        match signature {
            Some(signature_image) => {
                let element = elements::Image::from_dynamic_image(signature_image)
                    .map_err(|e| anyhow::anyhow!("No se pudo incrustar la firma: {e}"))?
                    .with_scale(genpdf::Scale::new(0.5, 0.5));
                doc.push(element);
            }
            // Assinatura malformada: linha em branco, sem abortar
            None => {
                doc.push(elements::Break::new(2.0));
                doc.push(elements::Paragraph::new("____________________________"));
            }
        }
        doc.push(elements::Paragraph::new(report.responsible_name.clone()));

        // --- ENLACE PÚBLICO (QR) ---
        if let Some(url) = public_url {
            doc.push(elements::Break::new(1.5));
            doc.push(elements::Paragraph::new("Informe en línea").styled(section_title));

            let code = QrCode::new(url.as_bytes())
                .map_err(|e| anyhow::anyhow!("No se pudo generar el código QR: {e}"))?;
            let qr_buffer = code.render::<Luma<u8>>().build();
            let qr_image = DynamicImage::ImageLuma8(qr_buffer);

            let element = elements::Image::from_dynamic_image(qr_image)
                .map_err(|e| anyhow::anyhow!("No se pudo incrustar el código QR: {e}"))?
                .with_scale(genpdf::Scale::new(0.5, 0.5));
            doc.push(element);
            doc.push(elements::Paragraph::new(url).styled(style::Style::new().with_font_size(8)));
        }

        // Renderiza para buffer (memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| anyhow::anyhow!("No se pudo renderizar el PDF: {e}"))?;

        Ok(buffer)
    }
}

// A assinatura só entra se for uma imagem data-URI bem formada;
// qualquer problema deixa a linha em branco.
fn load_signature_image(report: &VisitReport) -> Option<DynamicImage> {
    let raw = report.responsible_signature.trim();
    if raw.is_empty() {
        return None;
    }
    let (mime, bytes) = decode_data_uri(raw).ok()?;
    if !mime.starts_with("image/") {
        return None;
    }
    image::load_from_memory(&bytes).ok()
}

// --- Token: puro, testável sem banco ---

fn encode_public_token(
    secret: &str,
    visit_id: Uuid,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let claims = PublicReportClaims {
        sub: visit_id,
        aud: PUBLIC_REPORT_AUDIENCE.to_string(),
        exp: (now + Duration::days(TOKEN_MAX_AGE_DAYS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

fn decode_public_token(secret: &str, token: &str) -> Option<Uuid> {
    let mut validation = Validation::default();
    validation.set_audience(&[PUBLIC_REPORT_AUDIENCE]);

    decode::<PublicReportClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .ok()
    .map(|data| data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "secreto-de-prueba";

    #[test]
    fn token_round_trips_within_expiry() {
        let visit_id = Uuid::new_v4();
        let token = encode_public_token(SECRET, visit_id, Utc::now()).unwrap();

        assert_eq!(decode_public_token(SECRET, &token), Some(visit_id));
    }

    #[test]
    fn expired_token_resolves_to_nothing() {
        let visit_id = Uuid::new_v4();
        // Emitido há 31 dias: o exp (30 dias de vida) já passou
        let issued = Utc::now() - Duration::days(TOKEN_MAX_AGE_DAYS + 1);
        let token = encode_public_token(SECRET, visit_id, issued).unwrap();

        assert_eq!(decode_public_token(SECRET, &token), None);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_public_token(SECRET, Uuid::new_v4(), Utc::now()).unwrap();

        assert_eq!(decode_public_token("otro-secreto", &token), None);
    }

    #[test]
    fn wrong_audience_is_rejected() {
        // Um token do mesmo segredo mas com outro propósito não serve
        #[derive(Serialize)]
        struct OtherClaims {
            sub: Uuid,
            aud: String,
            exp: usize,
            iat: usize,
        }
        let now = Utc::now();
        let claims = OtherClaims {
            sub: Uuid::new_v4(),
            aud: "trust:otra-cosa".to_string(),
            exp: (now + Duration::days(1)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_ref()),
        )
        .unwrap();

        assert_eq!(decode_public_token(SECRET, &token), None);
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert_eq!(decode_public_token(SECRET, "no-es-un-jwt"), None);
        assert_eq!(decode_public_token(SECRET, ""), None);
    }
}
