//! Liens sortants (série temporelle NDVI, Google Maps)

use vecsource::Source;

/// Outil de série temporelle NDVI (reçoit l'URL de la source telle quelle)
pub const NDVI_TIMESERIES_BASE: &str =
    "https://huggingface.co/spaces/SustainabilityLabIITGN/NDVI_PERG?file_url=";

/// Lien vers l'outil NDVI, uniquement pour les sources distantes
pub fn ndvi_timeseries_url(source: &Source) -> Option<String> {
    source
        .url()
        .map(|url| format!("{}{}", NDVI_TIMESERIES_BASE, url))
}

/// Lien Google Maps (satellite) centré sur un point (lon, lat)
pub fn google_maps_url((lon, lat): (f64, f64)) -> String {
    format!(
        "http://maps.google.com/maps?q={},{}&layer=satellite",
        lat, lon
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecsource::UploadedFile;

    #[test]
    fn test_ndvi_link_uses_normalized_url() {
        let source = Source::Url("https://drive.google.com/file/d/ABC123/view".into());
        assert_eq!(
            ndvi_timeseries_url(&source).as_deref(),
            Some("https://huggingface.co/spaces/SustainabilityLabIITGN/NDVI_PERG?file_url=https://drive.google.com/uc?id=ABC123")
        );
    }

    #[test]
    fn test_no_ndvi_link_for_uploads() {
        let source = Source::Upload(UploadedFile::new("plot.kml", b"<kml/>".to_vec()));
        assert_eq!(ndvi_timeseries_url(&source), None);
    }

    #[test]
    fn test_google_maps_url() {
        assert_eq!(
            google_maps_url((72.5, 23.25)),
            "http://maps.google.com/maps?q=23.25,72.5&layer=satellite"
        );
    }
}
