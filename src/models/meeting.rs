//! Meeting and transcript shapes handed to the AI extraction service.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One utterance in a meeting transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct TranscriptSegment {
    /// Speaker name as recorded by the notetaker
    #[serde(default)]
    pub speaker: String,

    /// Spoken text
    pub text: String,

    /// Offset from the start of the recording, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_seconds: Option<f64>,
}

/// A recorded meeting with its transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(default)]
pub struct Meeting {
    pub id: String,
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    pub participants: Vec<String>,
    pub transcript: Vec<TranscriptSegment>,
}

impl Meeting {
    /// Render the transcript one segment per line as `[mm:ss] Speaker: text`.
    ///
    /// Segments without an offset omit the bracketed timestamp.
    pub fn format_transcript(&self) -> String {
        self.transcript
            .iter()
            .map(|segment| {
                let speaker = if segment.speaker.trim().is_empty() {
                    "Unknown"
                } else {
                    segment.speaker.trim()
                };
                match segment.start_seconds {
                    Some(secs) => format!(
                        "[{}] {}: {}",
                        format_timestamp(secs),
                        speaker,
                        segment.text.trim()
                    ),
                    None => format!("{}: {}", speaker, segment.text.trim()),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Header block (title, date, participants) followed by the transcript.
    pub fn to_context(&self) -> String {
        let mut out = format!("Meeting: {}\n", self.title);
        if let Some(started_at) = self.started_at {
            out.push_str(&format!("Date: {}\n", started_at.format("%Y-%m-%d %H:%M UTC")));
        }
        if !self.participants.is_empty() {
            out.push_str(&format!("Participants: {}\n", self.participants.join(", ")));
        }
        out.push_str("\nTranscript:\n");
        out.push_str(&self.format_transcript());
        out
    }
}

/// Format a second offset as `mm:ss` (or `h:mm:ss` past the hour).
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(75.9), "01:15");
        assert_eq!(format_timestamp(3725.0), "1:02:05");
        assert_eq!(format_timestamp(-3.0), "00:00");
    }

    #[test]
    fn test_format_transcript() {
        let meeting = Meeting {
            id: "m1".to_string(),
            title: "Intro".to_string(),
            transcript: vec![
                TranscriptSegment {
                    speaker: "Alice".to_string(),
                    text: " My new number is 555-0100. ".to_string(),
                    start_seconds: Some(65.0),
                },
                TranscriptSegment {
                    speaker: String::new(),
                    text: "Thanks".to_string(),
                    start_seconds: None,
                },
            ],
            ..Default::default()
        };

        assert_eq!(
            meeting.format_transcript(),
            "[01:05] Alice: My new number is 555-0100.\nUnknown: Thanks"
        );
        assert!(meeting.to_context().starts_with("Meeting: Intro\n"));
    }
}
