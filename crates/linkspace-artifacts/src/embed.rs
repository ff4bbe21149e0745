//! Embed url recognition
//!
//! Maps a user-supplied media url to the iframe the page should render.

use url::Url;

/// Length of a YouTube video id
const YOUTUBE_ID_LEN: usize = 11;

/// What an embed url points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedKind {
    YouTube { video_id: String },
    Tenor { post_id: String },
    /// Anything else is shown as a link placeholder
    Link,
}

impl EmbedKind {
    /// Recognize `raw`
    ///
    /// YouTube: `watch?v=ID`, `youtu.be/ID`, `/embed/ID`, `/v/ID`,
    /// `/shorts/ID`. Tenor: `tenor.com/view/<slug>-gif-<digits>`.
    pub fn classify(raw: &str) -> Self {
        let Ok(url) = Url::parse(raw.trim()) else {
            return EmbedKind::Link;
        };
        let Some(host) = url.host_str() else {
            return EmbedKind::Link;
        };
        let host = host.trim_start_matches("www.").trim_start_matches("m.");

        match host {
            "youtube.com" | "youtube-nocookie.com" => youtube_from_path(&url),
            "youtu.be" => first_segment(&url)
                .and_then(video_id)
                .map_or(EmbedKind::Link, |video_id| EmbedKind::YouTube { video_id }),
            "tenor.com" => tenor_post_id(&url)
                .map_or(EmbedKind::Link, |post_id| EmbedKind::Tenor { post_id }),
            _ => EmbedKind::Link,
        }
    }

    /// The iframe source for recognized media
    pub fn iframe_src(&self) -> Option<String> {
        match self {
            EmbedKind::YouTube { video_id } => Some(format!(
                "https://www.youtube.com/embed/{}?autoplay=1&mute=1&enablejsapi=1",
                video_id
            )),
            EmbedKind::Tenor { post_id } => {
                Some(format!("https://tenor.com/embed/{}?autoplay=1", post_id))
            }
            EmbedKind::Link => None,
        }
    }
}

fn first_segment(url: &Url) -> Option<&str> {
    url.path_segments()?.find(|s| !s.is_empty())
}

fn youtube_from_path(url: &Url) -> EmbedKind {
    let from_query = url
        .query_pairs()
        .find(|(k, _)| k == "v")
        .and_then(|(_, v)| video_id(&v));

    let from_path = || {
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        match segments.next()? {
            "embed" | "v" | "e" | "shorts" | "live" => segments.next().and_then(video_id),
            _ => None,
        }
    };

    from_query
        .or_else(from_path)
        .map_or(EmbedKind::Link, |video_id| EmbedKind::YouTube { video_id })
}

fn video_id(candidate: &str) -> Option<String> {
    let valid = candidate.len() == YOUTUBE_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| candidate.to_string())
}

fn tenor_post_id(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    if segments.next()? != "view" {
        return None;
    }
    let slug = segments.next()?;
    let (_, digits) = slug.rsplit_once("-gif-")?;
    let valid = !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
    valid.then(|| digits.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yt(id: &str) -> EmbedKind {
        EmbedKind::YouTube {
            video_id: id.to_string(),
        }
    }

    #[test]
    fn test_youtube_forms() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "https://m.youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            assert_eq!(EmbedKind::classify(url), yt("dQw4w9WgXcQ"), "{}", url);
        }
    }

    #[test]
    fn test_youtube_bad_id_is_link() {
        assert_eq!(
            EmbedKind::classify("https://www.youtube.com/watch?v=short"),
            EmbedKind::Link
        );
        assert_eq!(
            EmbedKind::classify("https://www.youtube.com/channel/UCabc"),
            EmbedKind::Link
        );
    }

    #[test]
    fn test_tenor() {
        assert_eq!(
            EmbedKind::classify("https://tenor.com/view/happy-cat-dance-gif-25190137"),
            EmbedKind::Tenor {
                post_id: "25190137".into()
            }
        );
        assert_eq!(
            EmbedKind::classify("https://tenor.com/view/not-a-gif"),
            EmbedKind::Link
        );
    }

    #[test]
    fn test_other_and_garbage() {
        assert_eq!(EmbedKind::classify("https://vimeo.com/123"), EmbedKind::Link);
        assert_eq!(EmbedKind::classify("not a url"), EmbedKind::Link);
    }

    #[test]
    fn test_iframe_src() {
        assert_eq!(
            yt("dQw4w9WgXcQ").iframe_src().unwrap(),
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&mute=1&enablejsapi=1"
        );
        assert!(EmbedKind::Link.iframe_src().is_none());
    }
}
