//! Manifest locator
//!
//! Turns the descriptor's (possibly relative) manifest URI into an absolute
//! URL, using the CDN base with the lowest priority.

use std::fmt;
use url::Url;

use crate::descriptor::{AssetDescriptor, CdnCandidate};
use crate::error::{GrabError, Result};

/// Absolute manifest URL, computed once per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifestUrl(Url);

impl ResolvedManifestUrl {
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ResolvedManifestUrl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolve the manifest location of a descriptor.
///
/// Refuses DRM protected assets before looking at anything else, so no
/// network access ever happens for them.
pub fn resolve(descriptor: &AssetDescriptor) -> Result<ResolvedManifestUrl> {
    if descriptor.drm_type != "none" {
        return Err(GrabError::InvalidDescriptor(format!(
            "content protected with DRM \"{}\", cannot download",
            descriptor.drm_type
        )));
    }

    let manifest_uri = descriptor.manifest_uri.trim();
    if manifest_uri.is_empty() {
        return Err(GrabError::ManifestMissing);
    }

    if let Some(url) = parse_absolute(manifest_uri) {
        tracing::debug!("manifest URI is absolute: {}", url);
        return Ok(ResolvedManifestUrl(url));
    }

    let cdn = select_cdn(&descriptor.cdn_candidates)
        .ok_or_else(|| GrabError::NoCdnCandidate(manifest_uri.to_string()))?;
    let url = join_base(&cdn.base_uri, manifest_uri)?;
    tracing::debug!(
        "combined manifest URL {} (cdn priority {})",
        url,
        cdn.priority
    );
    Ok(ResolvedManifestUrl(url))
}

/// Lowest priority wins; ties keep the first one in source order.
pub fn select_cdn(candidates: &[CdnCandidate]) -> Option<&CdnCandidate> {
    // min_by_key keeps the first of equal minimums.
    candidates.iter().min_by_key(|c| c.priority)
}

/// Parse `s` as an absolute http(s) URL
pub fn parse_absolute(s: &str) -> Option<Url> {
    Url::parse(s)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

/// Join a relative path onto a CDN base treated as a directory.
///
/// Exactly one `/` separates the two parts, whatever either side carries.
pub fn join_base(base: &str, relative: &str) -> Result<Url> {
    let dir = format!("{}/", base.trim().trim_end_matches('/'));
    let base_url = Url::parse(&dir)
        .map_err(|e| GrabError::InvalidDescriptor(format!("invalid CDN base_uri {}: {}", base, e)))?;
    base_url
        .join(relative.trim_start_matches('/'))
        .map_err(|e| GrabError::InvalidDescriptor(format!("cannot join {} onto {}: {}", relative, base, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorMetadata, PackageType};
    use crate::error::ErrorKind;

    fn descriptor(drm: &str, manifest: &str, cdns: &[(i64, &str)]) -> AssetDescriptor {
        AssetDescriptor {
            drm_type: drm.to_string(),
            package_type: PackageType::Hls,
            manifest_uri: manifest.to_string(),
            cdn_candidates: cdns
                .iter()
                .map(|(p, b)| CdnCandidate {
                    priority: *p,
                    base_uri: b.to_string(),
                })
                .collect(),
            metadata: DescriptorMetadata::default(),
        }
    }

    #[test]
    fn test_drm_is_refused() {
        let desc = descriptor("widevine", "https://x/m.m3u8", &[]);
        assert_eq!(resolve(&desc).unwrap_err().kind(), ErrorKind::InvalidDescriptor);
    }

    #[test]
    fn test_empty_manifest() {
        let desc = descriptor("none", "  ", &[(0, "https://cdn")]);
        assert_eq!(resolve(&desc).unwrap_err().kind(), ErrorKind::ManifestMissing);
    }

    #[test]
    fn test_relative_without_cdn() {
        let desc = descriptor("none", "a/master.m3u8", &[]);
        assert_eq!(resolve(&desc).unwrap_err().kind(), ErrorKind::NoCdnCandidate);
    }

    #[test]
    fn test_absolute_used_verbatim() {
        let desc = descriptor("none", "https://host/p/master.m3u8?t=1", &[(0, "https://cdn")]);
        assert_eq!(
            resolve(&desc).unwrap().as_str(),
            "https://host/p/master.m3u8?t=1"
        );
    }

    #[test]
    fn test_lowest_priority_wins_regardless_of_order() {
        let a = descriptor("none", "m.m3u8", &[(1, "https://A"), (0, "https://B")]);
        let b = descriptor("none", "m.m3u8", &[(0, "https://B"), (1, "https://A")]);
        assert_eq!(resolve(&a).unwrap().as_str(), "https://b/m.m3u8");
        assert_eq!(resolve(&a).unwrap(), resolve(&b).unwrap());
    }

    #[test]
    fn test_priority_tie_keeps_first() {
        let cdns = vec![
            CdnCandidate { priority: 2, base_uri: "https://first".into() },
            CdnCandidate { priority: 2, base_uri: "https://second".into() },
        ];
        assert_eq!(select_cdn(&cdns).unwrap().base_uri, "https://first");
    }

    #[test]
    fn test_join_slashes() {
        let expected = "https://cdn.example/vod/x/m.m3u8";
        for (base, rel) in [
            ("https://cdn.example/vod", "x/m.m3u8"),
            ("https://cdn.example/vod/", "x/m.m3u8"),
            ("https://cdn.example/vod/", "/x/m.m3u8"),
            ("https://cdn.example/vod//", "//x/m.m3u8"),
        ] {
            assert_eq!(join_base(base, rel).unwrap().as_str(), expected, "{} + {}", base, rel);
        }
    }

    #[test]
    fn test_bad_base_is_invalid_descriptor() {
        let desc = descriptor("none", "m.m3u8", &[(0, "not a url")]);
        assert_eq!(resolve(&desc).unwrap_err().kind(), ErrorKind::InvalidDescriptor);
    }
}
