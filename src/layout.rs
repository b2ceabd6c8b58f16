//! Collage layout resolution.
//!
//! Maps a photo count and a named arrangement to the grid geometry and canvas
//! size the compositor draws into.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of photos taken in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PhotoCount {
    #[default]
    Two,
    Three,
    Four,
}

impl PhotoCount {
    /// All selectable counts, in menu order.
    pub const ALL: [PhotoCount; 3] = [PhotoCount::Two, PhotoCount::Three, PhotoCount::Four];

    /// The count as a plain number.
    pub fn get(self) -> usize {
        match self {
            PhotoCount::Two => 2,
            PhotoCount::Three => 3,
            PhotoCount::Four => 4,
        }
    }
}

impl TryFrom<u8> for PhotoCount {
    type Error = InvalidPhotoCount;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            2 => Ok(PhotoCount::Two),
            3 => Ok(PhotoCount::Three),
            4 => Ok(PhotoCount::Four),
            other => Err(InvalidPhotoCount(other.into())),
        }
    }
}

impl TryFrom<usize> for PhotoCount {
    type Error = InvalidPhotoCount;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        u8::try_from(n)
            .map_err(|_| InvalidPhotoCount(n))
            .and_then(PhotoCount::try_from)
    }
}

impl From<PhotoCount> for u8 {
    fn from(count: PhotoCount) -> Self {
        count.get() as u8
    }
}

impl fmt::Display for PhotoCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Returned when a number outside 2..=4 is used as a photo count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("photo count must be 2, 3 or 4 (got {0})")]
pub struct InvalidPhotoCount(pub usize);

/// Named arrangement of the polaroid cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Layout {
    #[default]
    #[serde(rename = "side-by-side")]
    SideBySide,
    #[serde(rename = "up-and-down")]
    UpAndDown,
    #[serde(rename = "2x2-grid")]
    Grid2x2,
}

impl Layout {
    /// The kebab-case name used on the command line and in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::SideBySide => "side-by-side",
            Layout::UpAndDown => "up-and-down",
            Layout::Grid2x2 => "2x2-grid",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "side-by-side" => Ok(Layout::SideBySide),
            "up-and-down" => Ok(Layout::UpAndDown),
            "2x2-grid" | "grid" => Ok(Layout::Grid2x2),
            _ => Err(format!(
                "Unknown layout '{}'. Available layouts: side-by-side, up-and-down, 2x2-grid",
                s
            )),
        }
    }
}

/// Grid geometry and output canvas size for one collage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutSpec {
    pub columns: u32,
    pub rows: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl LayoutSpec {
    const fn new(columns: u32, rows: u32, canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            columns,
            rows,
            canvas_width,
            canvas_height,
        }
    }

    /// Two photos next to each other. Also the fallback for unmapped pairs.
    pub const TWO_SIDE_BY_SIDE: LayoutSpec = LayoutSpec::new(2, 1, 1400, 800);
    pub const TWO_UP_AND_DOWN: LayoutSpec = LayoutSpec::new(1, 2, 800, 1400);
    pub const THREE_SIDE_BY_SIDE: LayoutSpec = LayoutSpec::new(3, 1, 2000, 800);
    pub const FOUR_SIDE_BY_SIDE: LayoutSpec = LayoutSpec::new(4, 1, 2600, 800);
    pub const FOUR_GRID: LayoutSpec = LayoutSpec::new(2, 2, 1400, 1400);

    /// Number of card slots in the grid.
    pub fn cells(&self) -> u32 {
        self.columns * self.rows
    }
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self::TWO_SIDE_BY_SIDE
    }
}

/// The layout actually used for a count: three photos only fit side by side.
pub fn effective_layout(count: PhotoCount, layout: Layout) -> Layout {
    match count {
        PhotoCount::Three => Layout::SideBySide,
        _ => layout,
    }
}

/// Layouts offered for a given count.
pub fn layouts_for(count: PhotoCount) -> &'static [Layout] {
    match count {
        PhotoCount::Two => &[Layout::SideBySide, Layout::UpAndDown],
        PhotoCount::Three => &[Layout::SideBySide],
        PhotoCount::Four => &[Layout::SideBySide, Layout::Grid2x2],
    }
}

/// The layout a session actually shoots with: [`effective_layout`], replaced
/// by side-by-side when the count does not offer it.
pub fn normalize(count: PhotoCount, layout: Layout) -> Layout {
    let layout = effective_layout(count, layout);
    if layouts_for(count).contains(&layout) {
        layout
    } else {
        Layout::SideBySide
    }
}

/// Resolve the collage geometry for a count and layout.
///
/// Pairs outside the table (e.g. two photos in a 2x2 grid) fall back to the
/// two-photo side-by-side geometry.
pub fn resolve(count: PhotoCount, layout: Layout) -> LayoutSpec {
    match (count, effective_layout(count, layout)) {
        (PhotoCount::Two, Layout::SideBySide) => LayoutSpec::TWO_SIDE_BY_SIDE,
        (PhotoCount::Two, Layout::UpAndDown) => LayoutSpec::TWO_UP_AND_DOWN,
        (PhotoCount::Three, Layout::SideBySide) => LayoutSpec::THREE_SIDE_BY_SIDE,
        (PhotoCount::Four, Layout::SideBySide) => LayoutSpec::FOUR_SIDE_BY_SIDE,
        (PhotoCount::Four, Layout::Grid2x2) => LayoutSpec::FOUR_GRID,
        _ => LayoutSpec::default(),
    }
}
