//! Run options and command-line handling.

use std::path::PathBuf;

use crate::error::AppError;

/// Single source of truth for the score cutoff; nothing else hardcodes one.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
pub const DEFAULT_LABEL_PADDING: f32 = 4.0;

pub const USAGE: &str = "Usage: detect-edit <image.png|jpg> [detections.json] \
[--threshold 0.5] [--stroke-width 2] [--label-padding 4]";

/// Rendering/interaction options the canvas and exporter share.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    pub score_threshold: f32,
    pub stroke_width: f32,
    pub label_padding: f32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            stroke_width: DEFAULT_STROKE_WIDTH,
            label_padding: DEFAULT_LABEL_PADDING,
        }
    }
}

/// A parsed invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Launch {
    pub image_path: PathBuf,
    /// Explicit detections file; defaults to the image's sidecar.
    pub detections_path: Option<PathBuf>,
    pub options: Options,
}

impl Launch {
    /// Parse command-line arguments (without the program name). Invalid
    /// values are a startup error, never silently clamped.
    pub fn parse(args: &[String]) -> Result<Self, AppError> {
        let mut image_path = None;
        let mut detections_path = None;
        let mut options = Options::default();

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--threshold" => {
                    let value = flag_value(&mut iter, "--threshold")?;
                    if !(0.0..=1.0).contains(&value) {
                        return Err(AppError::Usage(format!(
                            "--threshold must be within 0..=1, got {value}"
                        )));
                    }
                    options.score_threshold = value;
                }
                "--stroke-width" => {
                    let value = flag_value(&mut iter, "--stroke-width")?;
                    if value <= 0.0 {
                        return Err(AppError::Usage(format!(
                            "--stroke-width must be positive, got {value}"
                        )));
                    }
                    options.stroke_width = value;
                }
                "--label-padding" => {
                    let value = flag_value(&mut iter, "--label-padding")?;
                    if value < 0.0 {
                        return Err(AppError::Usage(format!(
                            "--label-padding must not be negative, got {value}"
                        )));
                    }
                    options.label_padding = value;
                }
                flag if flag.starts_with("--") => {
                    return Err(AppError::Usage(format!("unknown flag {flag}")));
                }
                path if image_path.is_none() => image_path = Some(PathBuf::from(path)),
                path if detections_path.is_none() => detections_path = Some(PathBuf::from(path)),
                extra => {
                    return Err(AppError::Usage(format!("unexpected argument {extra}")));
                }
            }
        }

        let image_path =
            image_path.ok_or_else(|| AppError::Usage("missing image path".to_string()))?;
        Ok(Self {
            image_path,
            detections_path,
            options,
        })
    }
}

fn flag_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<f32, AppError> {
    let raw = iter
        .next()
        .ok_or_else(|| AppError::Usage(format!("{flag} needs a value")))?;
    raw.parse()
        .map_err(|_| AppError::Usage(format!("{flag}: not a number: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Launch, AppError> {
        let owned: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Launch::parse(&owned)
    }

    #[test]
    fn image_path_alone_uses_defaults() {
        let launch = parse(&["photo.jpg"]).unwrap();
        assert_eq!(launch.image_path, PathBuf::from("photo.jpg"));
        assert_eq!(launch.detections_path, None);
        assert_eq!(launch.options, Options::default());
        assert_eq!(launch.options.score_threshold, 0.5);
    }

    #[test]
    fn explicit_detections_path_and_threshold() {
        let launch = parse(&["photo.jpg", "run7.json", "--threshold", "0.3"]).unwrap();
        assert_eq!(launch.detections_path, Some(PathBuf::from("run7.json")));
        assert_eq!(launch.options.score_threshold, 0.3);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(parse(&["photo.jpg", "--threshold", "1.5"]).is_err());
        assert!(parse(&["photo.jpg", "--threshold", "-0.1"]).is_err());
        assert!(parse(&["photo.jpg", "--threshold", "abc"]).is_err());
        assert!(parse(&["photo.jpg", "--threshold"]).is_err());
    }

    #[test]
    fn rejects_unknown_flags_and_missing_image() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["photo.jpg", "--frobnicate"]).is_err());
        assert!(parse(&["a.jpg", "b.json", "c.json"]).is_err());
    }
}
