//! Deterministic storage path derivation.

use sreel_models::{Country, IdeaId, Persona};

/// Object key for a rendered video:
/// `videos/{idea}/{persona}-{country}/{filename}`.
pub fn video_key(idea_id: &IdeaId, persona: &Persona, country: &Country, filename: &str) -> String {
    format!("videos/{}/{}-{}/{}", idea_id, persona, country, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_key_layout() {
        let key = video_key(
            &IdeaId::from("idea-7"),
            &Persona::from("founder"),
            &Country::from("de"),
            "post-3.mp4",
        );
        assert_eq!(key, "videos/idea-7/founder-de/post-3.mp4");
    }
}
