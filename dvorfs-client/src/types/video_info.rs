use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub duration: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thumbnail: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub uploader: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub view_count: u64,
    #[serde(default)]
    pub formats: Vec<Format>
}

impl VideoInfo {
    /// Formats of one category, in backend order.
    pub fn formats_of(&self, format_type: FormatType) -> impl Iterator<Item = &Format> {
        self.formats
            .iter()
            .filter(move |f| f.format_type == format_type)
    }

    pub fn find_format(&self, format_type: FormatType, format_id: &str) -> Option<&Format> {
        self.formats_of(format_type)
            .find(|f| f.format_id == format_id)
    }

    /// `m:ss`, minutes are not folded into hours.
    pub fn duration_display(&self) -> String {
        format!("{}:{:02}", self.duration / 60, self.duration % 60)
    }

    pub fn view_count_display(&self) -> String {
        group_thousands(self.view_count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    pub format_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ext: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub resolution: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub filesize: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub format_note: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vcodec: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub acodec: String,
    #[serde(default)]
    pub quality: f64,
    pub format_type: FormatType
}

impl Format {
    pub fn has_video(&self) -> bool {
        !self.vcodec.is_empty() && self.vcodec != "none"
    }

    pub fn has_audio(&self) -> bool {
        !self.acodec.is_empty() && self.acodec != "none"
    }

    /// Value sent back to the download endpoint to select this format.
    pub fn quality_param(&self) -> String {
        self.quality.to_string()
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn filesize_mb(&self) -> f64 {
        self.filesize as f64 / 1_048_576.0
    }

    /// Option text for the quality picker.
    pub fn label(&self) -> String {
        let ext = self.ext.to_uppercase();
        match self.format_type {
            FormatType::Audio => format!("🎵 {} ({ext})", self.format_note),
            FormatType::Video => {
                let mut label = format!("🎥 {}p", self.quality);
                if !self.resolution.is_empty() {
                    label.push_str(" • ");
                    label.push_str(&self.resolution);
                }
                label.push_str(&format!(" • {:.1} MB • {ext}", self.filesize_mb()));
                label
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    #[default]
    Video,
    Audio
}

impl FormatType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio"
        }
    }

    /// Extension given to saved files. Fixed per category; the selected
    /// format's own `ext` is not consulted.
    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Audio => "m4a",
            Self::Video => "mp4"
        }
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown format type: {0}")]
pub struct UnknownFormatType(pub String);

impl FromStr for FormatType {
    type Err = UnknownFormatType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(UnknownFormatType(other.to_string()))
        }
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// The backend forwards extractor output as-is: counts may arrive as floats
// and text fields as null.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>
{
    let value = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(value
        .and_then(|n| n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)))
        .unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(id: &str, format_type: FormatType) -> Format {
        Format {
            format_id: id.to_string(),
            ext: "mp4".to_string(),
            resolution: String::new(),
            filesize: 0,
            format_note: String::new(),
            vcodec: "none".to_string(),
            acodec: "none".to_string(),
            quality: 0.0,
            format_type
        }
    }

    #[test]
    fn test_deserialize_backend_payload() {
        let json = r#"{
            "title": "Song",
            "duration": 212.6,
            "thumbnail": null,
            "uploader": "Artist",
            "view_count": 1500000,
            "formats": [
                {
                    "format_id": "137",
                    "ext": "mp4",
                    "resolution": "1920x1080",
                    "filesize": 1048576,
                    "format_note": "1080p",
                    "vcodec": "avc1.640028",
                    "acodec": "none",
                    "quality": 1080,
                    "format_type": "video"
                },
                {
                    "format_id": "140",
                    "ext": "m4a",
                    "format_note": "medium",
                    "vcodec": "none",
                    "acodec": "mp4a.40.2",
                    "quality": 128,
                    "format_type": "audio"
                }
            ]
        }"#;

        let info: VideoInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.title, "Song");
        assert_eq!(info.duration, 212);
        assert_eq!(info.thumbnail, "");
        assert_eq!(info.formats.len(), 2);
        assert_eq!(info.formats[1].format_type, FormatType::Audio);
        assert_eq!(info.formats[1].resolution, "");
        assert!(info.formats[0].has_video());
        assert!(!info.formats[0].has_audio());
        assert!(info.formats[1].has_audio());
    }

    #[test]
    fn test_unknown_format_type_is_rejected() {
        let json = r#"{"format_id": "x", "format_type": "subtitles"}"#;
        assert!(serde_json::from_str::<Format>(json).is_err());
        assert_eq!(
            "subtitles".parse::<FormatType>(),
            Err(UnknownFormatType("subtitles".to_string()))
        );
        assert_eq!("audio".parse::<FormatType>(), Ok(FormatType::Audio));
    }

    #[test]
    fn test_formats_of_keeps_backend_order() {
        let info = VideoInfo {
            formats: vec![
                format("a", FormatType::Video),
                format("b", FormatType::Audio),
                format("c", FormatType::Video)
            ],
            ..VideoInfo::default()
        };
        let ids: Vec<_> = info
            .formats_of(FormatType::Video)
            .map(|f| f.format_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(info.find_format(FormatType::Audio, "a").is_none());
        assert!(info.find_format(FormatType::Audio, "b").is_some());
    }

    #[test]
    fn test_quality_param_drops_integral_fraction() {
        let mut f = format("a", FormatType::Video);
        f.quality = 720.0;
        assert_eq!(f.quality_param(), "720");
        f.quality = 1.5;
        assert_eq!(f.quality_param(), "1.5");
    }

    #[test]
    fn test_video_label() {
        let mut f = format("a", FormatType::Video);
        f.quality = 720.0;
        f.filesize = 15 * 1_048_576 + 524_288;
        f.resolution = "1280x720".to_string();
        assert_eq!(f.label(), "🎥 720p • 1280x720 • 15.5 MB • MP4");

        f.resolution.clear();
        assert_eq!(f.label(), "🎥 720p • 15.5 MB • MP4");
    }

    #[test]
    fn test_audio_label() {
        let mut f = format("b", FormatType::Audio);
        f.ext = "m4a".to_string();
        f.format_note = "medium".to_string();
        assert_eq!(f.label(), "🎵 medium (M4A)");
    }

    #[test]
    fn test_duration_and_views_display() {
        let info = VideoInfo {
            duration: 212,
            view_count: 1_234_567,
            ..VideoInfo::default()
        };
        assert_eq!(info.duration_display(), "3:32");
        assert_eq!(info.view_count_display(), "1,234,567");

        let short = VideoInfo {
            duration: 5,
            view_count: 999,
            ..VideoInfo::default()
        };
        assert_eq!(short.duration_display(), "0:05");
        assert_eq!(short.view_count_display(), "999");
    }

    #[test]
    fn test_file_extension_per_type() {
        assert_eq!(FormatType::Audio.file_extension(), "m4a");
        assert_eq!(FormatType::Video.file_extension(), "mp4");
    }
}
