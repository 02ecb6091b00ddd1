use common::error::{AppError, Res};
use unlocker::clean_url;
use url::Url;

const AUTHOR_SEGMENT: &str = "/author/";

/// A validated storefront address and the identifiers derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storefront {
    /// Query-string stripped, trimmed URL. This is what gets fetched.
    pub url: String,
    /// `scheme://host[:port]`, used to build detail-page and ajax URLs.
    pub origin: String,
    /// Author id from the path, or the whole cleaned URL when the path has none.
    pub author_key: String,
}

impl Storefront {
    pub fn parse(raw: &str) -> Res<Self> {
        let url = clean_url(raw);
        if url.is_empty() {
            return Err(AppError::BadRequest("URL is required".to_string()));
        }

        let parsed = Url::parse(&url)
            .map_err(|e| AppError::BadRequest(format!("Invalid storefront URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(AppError::BadRequest(format!(
                "Invalid storefront URL: {}",
                url
            )));
        }

        let origin = parsed.origin().ascii_serialization();
        let author_key = author_id(&url).unwrap_or(&url).to_string();

        Ok(Storefront {
            url,
            origin,
            author_key,
        })
    }

    /// Cache key shared by every caller asking for this storefront.
    pub fn cache_key(&self) -> String {
        format!("author:{}", self.author_key)
    }

    /// Absolute URL for a storefront-relative path.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }
}

fn author_id(url: &str) -> Option<&str> {
    url.split(AUTHOR_SEGMENT)
        .nth(1)?
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_is_stripped_before_keying() {
        let storefront =
            Storefront::parse("https://site.example/stores/author/A123/allbooks?ref=xyz").unwrap();
        assert_eq!(storefront.url, "https://site.example/stores/author/A123/allbooks");
        assert_eq!(storefront.origin, "https://site.example");
        assert_eq!(storefront.cache_key(), "author:A123");
    }

    #[test]
    fn urls_without_author_segment_key_on_full_url() {
        let storefront = Storefront::parse(" https://site.example/stores/page/XYZ?x=1").unwrap();
        assert_eq!(
            storefront.cache_key(),
            "author:https://site.example/stores/page/XYZ"
        );
    }

    #[test]
    fn same_author_different_tracking_params_share_a_key() {
        let a = Storefront::parse("https://site.example/stores/author/A123/allbooks?ref=a").unwrap();
        let b = Storefront::parse("https://site.example/stores/author/A123/about").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn blank_and_malformed_urls_are_rejected() {
        assert!(matches!(
            Storefront::parse("   "),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            Storefront::parse("not a url"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            Storefront::parse("ftp://site.example/stores/author/A1"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn absolute_joins_origin_and_path() {
        let storefront = Storefront::parse("http://localhost:8081/stores/author/A1/allbooks").unwrap();
        assert_eq!(storefront.absolute("/dp/B01"), "http://localhost:8081/dp/B01");
    }
}
