//! Delivery-URL construction for transformed asset variants
//!
//! The image CDN serves pre-transformed renditions addressed entirely
//! through the URL path: `{base}/{transformations}/{public_id}`, where the
//! transformations segment is a comma-joined list of `key_value` pairs.
//! No pixels are touched here; only URLs are built.

/// Builds CDN delivery URLs.
///
/// `quality`, `format`, and `fetch_format` default to `auto`; later calls
/// replace a parameter in place so the segment order stays stable.
#[derive(Debug, Clone)]
pub struct DeliveryUrlBuilder {
    base_url: String,
    transformations: Vec<(String, String)>,
}

impl DeliveryUrlBuilder {
    /// Builder rooted at an arbitrary upload endpoint.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            transformations: vec![
                ("quality".to_string(), "auto".to_string()),
                ("format".to_string(), "auto".to_string()),
                ("fetch_format".to_string(), "auto".to_string()),
            ],
        }
    }

    /// Builder rooted at a named cloud's upload endpoint.
    #[must_use]
    pub fn for_cloud(cloud_name: &str) -> Self {
        Self::new(format!(
            "https://res.cloudinary.com/{cloud_name}/image/upload"
        ))
    }

    /// Set or replace one transformation parameter.
    #[must_use]
    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        if let Some(slot) = self.transformations.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.transformations.push((key.to_string(), value));
        }
        self
    }

    /// Constrain width in pixels.
    #[inline]
    #[must_use]
    pub fn width(self, px: u32) -> Self {
        self.set("width", px)
    }

    /// Constrain height in pixels.
    #[inline]
    #[must_use]
    pub fn height(self, px: u32) -> Self {
        self.set("height", px)
    }

    /// Override the quality parameter.
    #[inline]
    #[must_use]
    pub fn quality(self, quality: &str) -> Self {
        self.set("quality", quality)
    }

    /// Final URL for a public id.
    #[must_use]
    pub fn url(&self, public_id: &str) -> String {
        let params = self
            .transformations
            .iter()
            .map(|(k, v)| format!("{k}_{v}"))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}/{}/{}", self.base_url, params, public_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_auto_everything() {
        let url = DeliveryUrlBuilder::for_cloud("demo").url("gallery/rose");
        assert_eq!(
            url,
            "https://res.cloudinary.com/demo/image/upload/quality_auto,format_auto,fetch_format_auto/gallery/rose"
        );
    }

    #[test]
    fn width_appends_after_defaults() {
        let url = DeliveryUrlBuilder::new("https://cdn.test/upload")
            .width(400)
            .url("rose");
        assert_eq!(
            url,
            "https://cdn.test/upload/quality_auto,format_auto,fetch_format_auto,width_400/rose"
        );
    }

    #[test]
    fn overriding_replaces_in_place() {
        let url = DeliveryUrlBuilder::new("https://cdn.test/upload")
            .quality("80")
            .url("rose");
        assert_eq!(
            url,
            "https://cdn.test/upload/quality_80,format_auto,fetch_format_auto/rose"
        );
    }
}
