/// Build the HTTP client shared by the default overlay download and the geocoder.
///
/// User agent is set only on native targets. The browser sets its own user agent on wasm
/// targets, and trying to set a different one may upset some servers.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn http_client(user_agent: &str) -> reqwest::Client {
    match reqwest::Client::builder().user_agent(user_agent).build() {
        Ok(client) => client,
        Err(err) => {
            log::warn!("Could not set up the HTTP client ({err}), falling back to defaults.");
            reqwest::Client::new()
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn http_client(_user_agent: &str) -> reqwest::Client {
    reqwest::Client::new()
}

/// Whether `location` should be downloaded, as opposed to being read from the disk.
pub(crate) fn is_remote(location: &str) -> bool {
    reqwest::Url::parse(location).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}
