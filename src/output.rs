use crate::{Caption, Clip};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Colour band for a virality score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score > 8.0 {
            ScoreBand::High
        } else if score > 6.0 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    fn ansi(&self) -> &'static str {
        match self {
            ScoreBand::High => "\x1b[32m",
            ScoreBand::Medium => "\x1b[33m",
            ScoreBand::Low => "\x1b[31m",
        }
    }
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("{code}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Render one clip as a text card (numbering starts at 1)
pub fn render_card(number: usize, clip: &Clip, color: bool) -> String {
    let band = ScoreBand::of(clip.virality_score);
    let score = paint(&format!("★ {:.1}", clip.virality_score), band.ansi(), color);

    let mut lines = vec![
        format!("#{number}  {} - {}  {score} Virality Score", clip.start_time, clip.end_time),
        paint(&format!("Duration: {:.1}s", clip.duration()), DIM, color),
        paint(&clip.title, BOLD, color),
        clip.summary.clone(),
    ];

    if !clip.captions.is_empty() {
        lines.push(String::new());
        lines.extend(clip.captions.iter().map(|c| format!("  {}", caption_line(c))));
    }

    lines.push(String::new());
    lines.push(paint("[ Download Clip ]", DIM, color));
    lines.join("\n")
}

fn caption_line(caption: &Caption) -> String {
    format!("[{:>5.1}s - {:>5.1}s] {}", caption.start_time, caption.end_time, caption.text)
}

/// Render all clips as cards separated by blank lines
pub fn render_cards(clips: &[Clip], color: bool) -> String {
    let header = paint("Generated Clips", BOLD, color);
    let cards = clips
        .iter()
        .enumerate()
        .map(|(i, clip)| render_card(i + 1, clip, color))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{header}\n\n{cards}")
}

/// Render clips as pretty JSON (camelCase fields, same shape as the service response)
pub fn render_json(clips: &[Clip]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(clips)
}

pub fn render_empty_state() -> String {
    "Your AI-generated clips will appear here.\nPaste a YouTube link to discover the best moments from your videos."
        .to_string()
}

/// One line of a playback preview: playhead and the caption overlay
pub fn render_caption_frame(position: f64, caption: Option<&Caption>, color: bool) -> String {
    let overlay = caption.map(|c| paint(&c.text, BOLD, color)).unwrap_or_default();
    format!("▶ {position:>5.1}s  {overlay}")
}
