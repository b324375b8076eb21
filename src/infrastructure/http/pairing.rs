//! Pairing page served at `GET /qr`

use qrcode::render::svg;
use qrcode::QrCode;

use crate::domain::entities::{PairingMaterial, SessionState};

/// What `/qr` shows for a given session snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingView {
    Connected,
    Generating,
    Code(PairingMaterial),
}

impl PairingView {
    pub fn from_session(state: SessionState, material: Option<PairingMaterial>) -> Self {
        match (state, material) {
            (SessionState::Connected, _) => PairingView::Connected,
            (SessionState::Pairing, Some(material)) => PairingView::Code(material),
            _ => PairingView::Generating,
        }
    }
}

pub fn render_svg(material: &PairingMaterial) -> Result<String, qrcode::types::QrError> {
    let code = QrCode::new(material.as_str().as_bytes())?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(280, 280)
        .quiet_zone(true)
        .build())
}

pub const CONNECTED_PAGE: &str = "<!DOCTYPE html>\
<html><head><meta charset=\"utf-8\"><title>WhatsApp</title></head>\
<body style=\"font-family:sans-serif;text-align:center;margin-top:4em\">\
<h1>✅ Bot conectado</h1><p>La sesión de WhatsApp está activa.</p></body></html>";

pub const GENERATING_PAGE: &str = "<!DOCTYPE html>\
<html><head><meta charset=\"utf-8\"><meta http-equiv=\"refresh\" content=\"3\">\
<title>WhatsApp</title></head>\
<body style=\"font-family:sans-serif;text-align:center;margin-top:4em\">\
<h1>⏳ Generando código QR...</h1><p>Esta página se actualiza sola.</p></body></html>";
