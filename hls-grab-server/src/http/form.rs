//! `/download` form fields

use hls_grab_lib::naming::NamingOverrides;
use hls_grab_lib::preferences::parse_languages;
use hls_grab_lib::{
    AssetDescriptor, AudioMode, Container, PlanRequest, Preferences, RequestHeaders, Result,
    SubtitleMode,
};
use serde::Deserialize;

use crate::config::ServerConfig;

/// Raw urlencoded form. Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DownloadForm {
    pub json_input: String,
    pub output: String,
    pub container: String,
    pub series_title: String,
    pub episode_title: String,
    pub season_number: String,
    pub episode_number: String,
    pub user_agent: String,
    pub referer: String,
    pub origin: String,
    pub cookie: String,
    pub extra_headers: String,
    pub force_aac: Option<String>,
    pub audio_mode: Option<String>,
    pub audio_pref: String,
    pub subs_mode: Option<String>,
    pub subs_pref: String,
}

impl DownloadForm {
    /// Lenient mode parsing: a missing audio mode means `prefer`, unknown
    /// values fall back to the defaults.
    pub fn preferences(&self) -> Preferences {
        let audio_mode = self
            .audio_mode
            .as_deref()
            .map_or(AudioMode::Prefer, |m| m.parse().unwrap_or_default());
        let subtitle_mode: SubtitleMode = self
            .subs_mode
            .as_deref()
            .map_or(SubtitleMode::None, |m| m.parse().unwrap_or_default());
        let container: Container = self.container.parse().unwrap_or_default();

        Preferences {
            audio_mode,
            audio_languages: parse_languages(&self.audio_pref),
            subtitle_mode,
            subtitle_languages: parse_languages(&self.subs_pref),
            force_aac: self.force_aac.as_deref() == Some("on"),
            container,
            disable_variant_selection: false,
        }
    }

    pub fn headers(&self, config: &ServerConfig) -> RequestHeaders {
        let user_agent = match self.user_agent.trim() {
            "" => config.fetch.default_user_agent.as_str(),
            ua => ua,
        };
        RequestHeaders::from_fields(
            user_agent,
            &self.referer,
            &self.origin,
            &self.cookie,
            &self.extra_headers,
        )
    }

    pub fn naming(&self) -> NamingOverrides {
        NamingOverrides {
            output: self.output.clone(),
            series: self.series_title.clone(),
            season: self.season_number.clone(),
            episode: self.episode_number.clone(),
            title: self.episode_title.clone(),
        }
    }

    /// Parse the descriptor and collect everything the planner needs.
    pub fn into_plan_request(self, config: &ServerConfig) -> Result<PlanRequest> {
        let descriptor = AssetDescriptor::from_json(&self.json_input)?;
        Ok(PlanRequest {
            descriptor,
            preferences: self.preferences(),
            headers: self.headers(config),
            naming: self.naming(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hls_grab_lib::ErrorKind;

    /// Decode a urlencoded body the way the `Form` extractor sees it.
    fn form(pairs: &str) -> DownloadForm {
        let url = url::Url::parse(&format!("http://x/?{}", pairs)).unwrap();
        let map: serde_json::Map<String, serde_json::Value> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), serde_json::Value::String(v.into_owned())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn test_defaults() {
        let prefs = form("").preferences();
        assert_eq!(prefs.audio_mode, AudioMode::Prefer);
        assert!(prefs.audio_languages.is_empty());
        assert_eq!(prefs.subtitle_mode, SubtitleMode::None);
        assert_eq!(prefs.container, Container::Mp4);
        assert!(!prefs.force_aac);
    }

    #[test]
    fn test_modes_and_languages() {
        let prefs = form(
            "audio_mode=all&subs_mode=prefer&subs_pref=SPA,%20eng&container=MKV&force_aac=on",
        )
        .preferences();
        assert_eq!(prefs.audio_mode, AudioMode::All);
        assert_eq!(prefs.subtitle_mode, SubtitleMode::Prefer);
        assert_eq!(prefs.subtitle_languages, vec!["spa", "eng"]);
        assert_eq!(prefs.container, Container::Mkv);
        assert!(prefs.force_aac);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let prefs = form("audio_mode=loud&subs_mode=some&container=avi").preferences();
        assert_eq!(prefs.audio_mode, AudioMode::Default);
        assert_eq!(prefs.subtitle_mode, SubtitleMode::None);
        assert_eq!(prefs.container, Container::Mp4);
    }

    #[test]
    fn test_headers_use_configured_user_agent() {
        let mut config = ServerConfig::default();
        config.fetch.default_user_agent = "Grabber/1.0".to_string();
        let headers = form("cookie=a%3Db&extra_headers=X-A%3A%201%0AX-B%3A%202").headers(&config);
        assert_eq!(headers.user_agent, "Grabber/1.0");
        assert_eq!(headers.cookie.as_deref(), Some("a=b"));
        assert_eq!(headers.extra.len(), 2);
    }

    #[test]
    fn test_bad_json_is_invalid_descriptor() {
        let err = form("json_input=%7Bnope")
            .into_plan_request(&ServerConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDescriptor);

        let err = DownloadForm::default()
            .into_plan_request(&ServerConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDescriptor);
    }

    #[test]
    fn test_naming_fields() {
        let naming = form("series_title=Foo&season_number=1&episode_number=2&episode_title=Pilot")
            .naming();
        assert_eq!(naming.series, "Foo");
        assert_eq!(naming.season, "1");
        assert_eq!(naming.episode, "2");
        assert_eq!(naming.title, "Pilot");
        assert!(naming.output.is_empty());
    }
}
