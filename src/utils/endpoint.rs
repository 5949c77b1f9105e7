// src/utils/endpoint.rs

use url::Url;

/// Makes `base` safe to `join` relative paths onto.
///
/// `Url::join` drops the last path segment unless it ends in `/`, so a base of
/// `https://host/prefix` would otherwise lose `prefix`.
pub fn as_base(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}
