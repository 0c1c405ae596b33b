/// A song placement: a released track featuring one of the loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Video {
    pub id: &'static str,
    pub title: &'static str,
}

/// Placement videos, newest additions last.
pub const VIDEOS: &[Video] = &[
    Video { id: "2Rlrue-imXY-VE", title: "Ruger ft Zlatan ibile - Giveaway" },
    Video { id: "wnOr9sdQiNQ", title: "Cosha TG - Big ft. Calboy" },
    Video { id: "a9fC3FA41qQ", title: "Fetty Wap - Cologne" },
    Video { id: "_WB4RJrrYwU", title: "NFL Toon - Understand" },
    Video { id: "orJfDav-VOc", title: "YoungNef - October 5th" },
    Video { id: "sTvzf1oLrhc", title: "Kash Juliano ft XanMan - My Brother" },
    Video { id: "c-e0SyC--CA", title: "Hotboii - Gotta Question" },
    Video { id: "d_yykxRBGwQ", title: "Yung Plinko ft YFL Pooh & YFL Kelvin - Triplets" },
];

/// How many videos are visible at once.
pub const VIDEOS_PER_PAGE: usize = 3;

pub fn embed_url(video: &Video) -> String {
    format!("https://www.youtube.com/embed/{}", video.id)
}

/// Sliding window over the placement list. `next` wraps back to the start
/// once the window would run past the end; `prev` wraps to the last full
/// window.
#[derive(Debug, Clone, Copy)]
pub struct Carousel {
    videos: &'static [Video],
    index: usize,
}

impl Default for Carousel {
    fn default() -> Self {
        Self { videos: VIDEOS, index: 0 }
    }
}

impl Carousel {
    #[cfg(test)]
    fn with_videos(videos: &'static [Video]) -> Self {
        Self { videos, index: 0 }
    }

    pub fn visible(&self) -> &[Video] {
        let end = (self.index + VIDEOS_PER_PAGE).min(self.videos.len());
        &self.videos[self.index.min(self.videos.len())..end]
    }

    pub fn next_disabled(&self) -> bool {
        self.videos.len() - self.index <= VIDEOS_PER_PAGE
    }

    pub fn prev_disabled(&self) -> bool {
        self.index == 0
    }

    pub fn next(&mut self) {
        self.index = if self.index + VIDEOS_PER_PAGE >= self.videos.len() {
            0
        } else {
            self.index + VIDEOS_PER_PAGE
        };
    }

    pub fn prev(&mut self) {
        self.index = if self.index < VIDEOS_PER_PAGE {
            self.videos.len().saturating_sub(VIDEOS_PER_PAGE)
        } else {
            self.index - VIDEOS_PER_PAGE
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE: &[Video] = &[
        Video { id: "a", title: "A" },
        Video { id: "b", title: "B" },
        Video { id: "c", title: "C" },
        Video { id: "d", title: "D" },
        Video { id: "e", title: "E" },
    ];

    #[test]
    fn test_initial_window() {
        let carousel = Carousel::with_videos(FIVE);
        let ids: Vec<_> = carousel.visible().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(carousel.prev_disabled());
        assert!(!carousel.next_disabled());
    }

    #[test]
    fn test_next_advances_then_wraps() {
        let mut carousel = Carousel::with_videos(FIVE);
        carousel.next();
        let ids: Vec<_> = carousel.visible().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec!["d", "e"]);
        assert!(carousel.next_disabled());

        carousel.next();
        assert_eq!(carousel.visible()[0].id, "a");
    }

    #[test]
    fn test_prev_wraps_to_last_window() {
        let mut carousel = Carousel::with_videos(FIVE);
        carousel.prev();
        let ids: Vec<_> = carousel.visible().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec!["c", "d", "e"]);
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            embed_url(&Video { id: "abc123", title: "x" }),
            "https://www.youtube.com/embed/abc123"
        );
    }

    #[test]
    fn test_full_list_pages_cleanly() {
        let mut carousel = Carousel::default();
        assert_eq!(carousel.visible().len(), 3);
        carousel.next();
        carousel.next();
        assert_eq!(carousel.visible().len(), 2);
        assert!(carousel.next_disabled());
    }
}
