use reqwest::Url;

/// Launch-time overrides: page text and model reference
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LaunchParams {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub model: Option<String>,
    pub asset: Option<String>,
}

impl LaunchParams {
    /// Read parameters from a URL query string (`title=…&model=…`).
    /// A leading `?` is accepted; for repeated keys the first one counts.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let url = match Url::parse(&format!("showcase://launch/?{query}")) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Ignoring malformed query {:?}: {}", query, e);
                return Self::default();
            }
        };

        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            let slot = match key.as_ref() {
                "title" => &mut params.title,
                "subtitle" => &mut params.subtitle,
                "model" => &mut params.model,
                "asset" => &mut params.asset,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// Values present in `overrides` replace ours
    pub fn merge(self, overrides: LaunchParams) -> Self {
        Self {
            title: overrides.title.or(self.title),
            subtitle: overrides.subtitle.or(self.subtitle),
            model: overrides.model.or(self.model),
            asset: overrides.asset.or(self.asset),
        }
    }
}
