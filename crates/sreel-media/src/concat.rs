//! Concat descriptor construction.
//!
//! The FFmpeg concat demuxer reads a script of `file`/`duration` pairs.
//! A `duration` directive controls the gap before the *next* entry, so the
//! true last frame would display for zero time without a trailing un-timed
//! repeat of its file. `for_slides` therefore always emits N duration-tagged
//! entries plus one terminal repeat of entry N.

use sreel_models::SlideFrame;

/// One line pair in the concat script.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatEntry {
    /// Frame file name, relative to the scratch workspace
    pub file: String,
    /// Display duration in seconds; `None` only for the terminal repeat
    pub duration: Option<f64>,
}

/// Ordered list of frame references fed to the encoder.
#[derive(Debug, Clone)]
pub struct ConcatDescriptor {
    entries: Vec<ConcatEntry>,
}

/// Scratch file name for a slide's frame image.
pub fn frame_filename(slide_number: u32) -> String {
    format!("frame_{:04}.png", slide_number)
}

/// Frames in ascending slide order, regardless of input order.
pub fn sort_slides(frames: &[SlideFrame]) -> Vec<&SlideFrame> {
    let mut ordered: Vec<&SlideFrame> = frames.iter().collect();
    ordered.sort_by_key(|f| f.slide_number);
    ordered
}

impl ConcatDescriptor {
    /// Build the descriptor for a frame set.
    ///
    /// Input order is irrelevant; entries come out in ascending
    /// `slide_number` order. Returns `None` for an empty frame set.
    pub fn for_slides(frames: &[SlideFrame], seconds_per_slide: f64) -> Option<Self> {
        let ordered = sort_slides(frames);
        let last = ordered.last()?;

        let mut entries: Vec<ConcatEntry> = ordered
            .iter()
            .map(|frame| ConcatEntry {
                file: frame_filename(frame.slide_number),
                duration: Some(seconds_per_slide),
            })
            .collect();

        // Terminal repeat: same file as the last frame, no duration.
        entries.push(ConcatEntry {
            file: frame_filename(last.slide_number),
            duration: None,
        });

        Some(Self { entries })
    }

    pub fn entries(&self) -> &[ConcatEntry] {
        &self.entries
    }

    /// Render the ffconcat script.
    pub fn to_script(&self) -> String {
        let mut script = String::from("ffconcat version 1.0\n");
        for entry in &self.entries {
            script.push_str(&format!("file '{}'\n", entry.file));
            if let Some(duration) = entry.duration {
                script.push_str(&format!("duration {}\n", duration));
            }
        }
        script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(slide_number: u32) -> SlideFrame {
        SlideFrame {
            slide_number,
            image: vec![0u8; 4],
        }
    }

    #[test]
    fn test_three_frames_yield_four_entries() {
        let frames = vec![frame(1), frame(2), frame(3)];
        let descriptor = ConcatDescriptor::for_slides(&frames, 4.0).unwrap();

        let entries = descriptor.entries();
        assert_eq!(entries.len(), 4);
        for entry in &entries[..3] {
            assert_eq!(entry.duration, Some(4.0));
        }
        // Terminal repeat: last frame's file, no duration
        assert_eq!(entries[3].file, entries[2].file);
        assert_eq!(entries[3].duration, None);
    }

    #[test]
    fn test_out_of_order_input_is_sorted_by_slide_number() {
        let frames = vec![frame(3), frame(1), frame(2)];
        let descriptor = ConcatDescriptor::for_slides(&frames, 2.5).unwrap();

        let files: Vec<&str> = descriptor
            .entries()
            .iter()
            .map(|e| e.file.as_str())
            .collect();
        assert_eq!(
            files,
            vec![
                "frame_0001.png",
                "frame_0002.png",
                "frame_0003.png",
                "frame_0003.png",
            ]
        );
    }

    #[test]
    fn test_empty_frame_set_has_no_descriptor() {
        assert!(ConcatDescriptor::for_slides(&[], 4.0).is_none());
    }

    #[test]
    fn test_script_rendering() {
        let frames = vec![frame(1), frame(2)];
        let script = ConcatDescriptor::for_slides(&frames, 4.0)
            .unwrap()
            .to_script();

        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(
            lines,
            vec![
                "ffconcat version 1.0",
                "file 'frame_0001.png'",
                "duration 4",
                "file 'frame_0002.png'",
                "duration 4",
                "file 'frame_0002.png'",
            ]
        );
    }

    #[test]
    fn test_single_frame_still_gets_terminal_repeat() {
        let frames = vec![frame(7)];
        let entries_len = ConcatDescriptor::for_slides(&frames, 1.0)
            .unwrap()
            .entries()
            .len();
        assert_eq!(entries_len, 2);
    }
}
