//! Timeline point model
//!
//! A [`TimelinePoint`] is one observation pushed by the agent feed. Points
//! carry any combination of a captured frame, a console chunk and a proposal
//! set; the only field that relates points to each other is `time`.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Reference to an image, either on disk or inline as a `data:` URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageRef {
    /// Image stored on the local filesystem
    Path(PathBuf),
    /// Inline `data:<mime>;base64,<payload>` image
    Inline { mime: String, data: String },
}

impl ImageRef {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ImageRef::Path(path.into())
    }

    /// Short human-readable label (file name or mime type)
    pub fn label(&self) -> String {
        match self {
            ImageRef::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            ImageRef::Inline { mime, data } => format!("{mime} ({} bytes b64)", data.len()),
        }
    }
}

impl From<String> for ImageRef {
    fn from(raw: String) -> Self {
        if let Some(rest) = raw.strip_prefix("data:") {
            if let Some((header, payload)) = rest.split_once(',') {
                let mime = header.strip_suffix(";base64").unwrap_or(header);
                return ImageRef::Inline {
                    mime: mime.to_string(),
                    data: payload.to_string(),
                };
            }
        }
        ImageRef::Path(PathBuf::from(raw))
    }
}

impl From<ImageRef> for String {
    fn from(image: ImageRef) -> Self {
        image.to_string()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Path(path) => write!(f, "{}", path.display()),
            ImageRef::Inline { mime, data } => write!(f, "data:{mime};base64,{data}"),
        }
    }
}

/// Logical size and offset of the captured region
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    None,
    Left,
    Middle,
    Right,
}

/// Pointer position at capture time, in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CursorPos {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub button: PointerButton,
}

/// Which renderer a point is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKind {
    Frame,
    Console,
    Proposals,
}

/// One timestamped telemetry sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Seconds. `NaN` when the producer omitted it; the index substitutes a
    /// position-derived time for non-finite values.
    #[serde(default = "missing_time", deserialize_with = "deserialize_time")]
    pub time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageRef>,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorPos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proposals: Vec<ImageRef>,
}

fn missing_time() -> f64 {
    f64::NAN
}

fn deserialize_time<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl TimelinePoint {
    /// Bare point at `time` with no payload
    pub fn at(time: f64) -> Self {
        Self {
            time,
            frame: None,
            thumbnail: None,
            location: String::new(),
            viewport: None,
            cursor: None,
            text: None,
            session_id: None,
            proposals: Vec::new(),
        }
    }

    /// Console chunk belonging to `session_id`
    pub fn console(time: f64, session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            session_id: Some(session_id.into()),
            ..Self::at(time)
        }
    }

    /// Captured frame
    pub fn frame(time: f64, frame: ImageRef) -> Self {
        Self {
            frame: Some(frame),
            ..Self::at(time)
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: ImageRef) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn with_cursor(mut self, x: f64, y: f64) -> Self {
        self.cursor = Some(CursorPos {
            x,
            y,
            button: PointerButton::None,
        });
        self
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = Some(Viewport {
            x: 0.0,
            y: 0.0,
            width,
            height,
        });
        self
    }

    pub fn with_proposals(mut self, proposals: Vec<ImageRef>) -> Self {
        self.proposals = proposals;
        self
    }

    pub fn is_console(&self) -> bool {
        self.text.is_some() || self.session_id.is_some()
    }

    /// Preferred renderer: proposals, then console, then frame
    pub fn kind(&self) -> Option<PointKind> {
        if !self.proposals.is_empty() {
            Some(PointKind::Proposals)
        } else if self.is_console() {
            Some(PointKind::Console)
        } else if self.frame.is_some() {
            Some(PointKind::Frame)
        } else {
            None
        }
    }

    /// Image to show when hovering this point on the track
    pub fn preview_image(&self) -> Option<&ImageRef> {
        self.thumbnail.as_ref().or(self.frame.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_ref_parses_data_url() {
        let image = ImageRef::from("data:image/png;base64,AAAA".to_string());
        assert_eq!(
            image,
            ImageRef::Inline {
                mime: "image/png".to_string(),
                data: "AAAA".to_string()
            }
        );
        assert_eq!(image.to_string(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn image_ref_falls_back_to_path() {
        let image = ImageRef::from("screenshots/step-1.png".to_string());
        assert_eq!(image, ImageRef::path("screenshots/step-1.png"));
        assert_eq!(image.label(), "step-1.png");
    }

    #[test]
    fn missing_or_null_time_deserializes_as_nan() {
        let point: TimelinePoint = serde_json::from_str(r#"{"location":"x"}"#).unwrap();
        assert!(point.time.is_nan());
        let point: TimelinePoint = serde_json::from_str(r#"{"time":null}"#).unwrap();
        assert!(point.time.is_nan());
    }

    #[test]
    fn point_deserializes_full_payload() {
        let json = r#"{
            "time": 2.5,
            "frame": "frames/a.png",
            "location": "https://example.com",
            "viewport": {"width": 1280, "height": 720},
            "cursor": {"x": 10, "y": 400, "button": "left"},
            "proposals": ["p/1.png", "p/2.png"]
        }"#;
        let point: TimelinePoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.time, 2.5);
        assert_eq!(point.viewport.unwrap().height, 720.0);
        assert_eq!(point.cursor.unwrap().button, PointerButton::Left);
        assert_eq!(point.proposals.len(), 2);
        assert_eq!(point.kind(), Some(PointKind::Proposals));
    }

    #[test]
    fn kind_prefers_console_over_frame() {
        let point = TimelinePoint {
            frame: Some(ImageRef::path("a.png")),
            ..TimelinePoint::console(1.0, "s", "hi")
        };
        assert_eq!(point.kind(), Some(PointKind::Console));
        assert_eq!(TimelinePoint::at(0.0).kind(), None);
    }

    #[test]
    fn preview_prefers_thumbnail() {
        let point = TimelinePoint::frame(1.0, ImageRef::path("full.png"))
            .with_thumbnail(ImageRef::path("thumb.png"));
        assert_eq!(point.preview_image(), Some(&ImageRef::path("thumb.png")));
    }
}
