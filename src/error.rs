use std::path::PathBuf;
use thiserror::Error;

/// Failures reported to the user. The `Display` text is the message printed
/// on standard output before exiting with status 1.
#[derive(Debug, Error)]
pub enum ToneError {
    #[error("Uso: watermark-tone <ruta_imagen> <factor_escala>")]
    Usage,

    #[error("El factor de escala debe ser un número.")]
    InvalidScaleFactor(String),

    #[error("Error al cargar la imagen. Verifique la ruta y el formato del archivo.")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Error al cargar la imagen. Verifique la ruta y el formato del archivo.")]
    EmptyImage(PathBuf),

    #[error("La región inferior está vacía (factor de escala {0}).")]
    EmptyRegion(f64),
}

/// Parse the scale factor argument. Only finite floating-point literals are
/// accepted.
pub fn parse_scale_factor(raw: &str) -> Result<f64, ToneError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ToneError::InvalidScaleFactor(raw.to_string())),
    }
}
