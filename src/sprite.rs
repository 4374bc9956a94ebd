//! Alpha-channel images, collision bitmasks and sprite-sheet entity extraction
//!
//! Asset decoding is an external concern: the core only ever sees the alpha
//! channel of a decoded sheet ([`AlphaImage`]). From it we derive word-packed
//! opacity bitmasks ([`Mask`]) for pixel-accurate collision, and split sheets
//! into individually addressable entities (pickups, projectile templates) by
//! connected-opaque-region analysis.

/// Sheets narrower than this are treated as absent placeholders and yield no
/// entities (a failed asset load hands the core a tiny blank surface).
pub const MIN_SHEET_WIDTH: u32 = 100;

/// Axis-aligned integer rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.w as i32 && py < self.y + self.h as i32
    }
}

/// The alpha channel of a decoded image, row-major, one byte per pixel
#[derive(Debug, Clone, Default)]
pub struct AlphaImage {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl AlphaImage {
    /// Wrap a raw alpha buffer. `alpha.len()` must equal `width * height`.
    pub fn new(width: u32, height: u32, alpha: Vec<u8>) -> Self {
        assert_eq!(alpha.len(), (width * height) as usize, "alpha buffer size mismatch");
        Self { width, height, alpha }
    }

    /// Build from a per-pixel closure (mostly useful in tests and demos)
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Self {
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                alpha.push(f(x, y));
            }
        }
        Self { width, height, alpha }
    }

    /// Fully transparent placeholder, stands in for a failed asset load
    pub fn placeholder() -> Self {
        Self::new(MIN_SHEET_WIDTH, MIN_SHEET_WIDTH, vec![0; (MIN_SHEET_WIDTH * MIN_SHEET_WIDTH) as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alpha at (x, y); any out-of-bounds sample reads as fully transparent.
    ///
    /// Platform probing during falls can wander outside the layer, which must
    /// be recovered as "no platform" rather than an error.
    #[inline]
    pub fn alpha_at(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.alpha[(y as u32 * self.width + x as u32) as usize]
    }

    #[inline]
    pub fn is_opaque(&self, x: i32, y: i32) -> bool {
        self.alpha_at(x, y) > 0
    }
}

/// Word-packed per-pixel opacity bitmap used for collision tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl Mask {
    /// Mask covering a sub-rectangle of an image; a pixel is set iff its
    /// alpha is non-zero. The mask's own origin is the rect's top-left.
    pub fn from_region(img: &AlphaImage, rect: PixelRect) -> Self {
        let words_per_row = (rect.w as usize).div_ceil(64);
        let mut bits = vec![0u64; words_per_row * rect.h as usize];
        for y in 0..rect.h {
            for x in 0..rect.w {
                if img.is_opaque(rect.x + x as i32, rect.y + y as i32) {
                    bits[y as usize * words_per_row + x as usize / 64] |= 1 << (x % 64);
                }
            }
        }
        Self { width: rect.w, height: rect.h, words_per_row, bits }
    }

    /// Mask of a whole image
    pub fn from_alpha(img: &AlphaImage) -> Self {
        Self::from_region(img, PixelRect::new(0, 0, img.width, img.height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.bits[y as usize * self.words_per_row + x as usize / 64] & (1 << (x as u32 % 64)) != 0
    }

    /// Count of set pixels
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// True if any pixel is opaque in both masks, with `other`'s origin
    /// offset by `(dx, dy)` relative to this mask's origin. Negative offsets
    /// are legal; non-overlapping placements simply return false.
    pub fn overlap(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let (dx, dy) = offset;
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (dx + other.width as i32).min(self.width as i32);
        let y1 = (dy + other.height as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return false;
        }
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x - dx, y - dy) {
                    return true;
                }
            }
        }
        false
    }
}

/// An extracted sheet entity: a pickup or a projectile template
#[derive(Debug, Clone)]
pub struct Entity {
    /// Category label (artifact name for pickups)
    pub label: String,
    /// Bounding rect within the source sheet (render-time sub-image lookup)
    pub rect: PixelRect,
    /// Opacity mask of the cropped sub-image
    pub mask: Mask,
    /// Pickups only: cleared once collected, restored on loop reset
    pub active: bool,
}

/// Separate a sheet's disjoint opaque blobs into entities.
///
/// Bounding boxes of 8-connected opaque regions, sorted left-to-right, each
/// labelled by cycling through `labels` by position. Sheets at or below
/// [`MIN_SHEET_WIDTH`] yield nothing.
pub fn extract_entities(sheet: &AlphaImage, labels: &[&str]) -> Vec<Entity> {
    if sheet.width <= MIN_SHEET_WIDTH || labels.is_empty() {
        return Vec::new();
    }
    let mut rects = connected_regions(sheet);
    rects.sort_by_key(|r| r.x);
    rects
        .into_iter()
        .enumerate()
        .map(|(i, rect)| Entity {
            label: labels[i % labels.len()].to_string(),
            rect,
            mask: Mask::from_region(sheet, rect),
            active: true,
        })
        .collect()
}

/// Split a horizontal animation strip into `cols` equal-width frames, each
/// cropped to its opaque bounding box. Frames with no opaque pixels keep the
/// full cell so animation indexing stays dense.
pub fn split_frames(sheet: &AlphaImage, cols: u32) -> Vec<Entity> {
    if cols == 0 || sheet.width == 0 {
        return Vec::new();
    }
    let fw = sheet.width / cols;
    let fh = sheet.height;
    (0..cols)
        .map(|i| {
            let cell = PixelRect::new((i * fw) as i32, 0, fw, fh);
            let rect = opaque_bounds_in(sheet, cell).unwrap_or(cell);
            Entity {
                label: String::new(),
                rect,
                mask: Mask::from_region(sheet, rect),
                active: true,
            }
        })
        .collect()
}

/// Bounding boxes of 8-connected opaque regions, in discovery order
fn connected_regions(img: &AlphaImage) -> Vec<PixelRect> {
    let (w, h) = (img.width as i32, img.height as i32);
    let mut visited = vec![false; (w * h) as usize];
    let mut rects = Vec::new();
    let mut stack = Vec::new();

    for sy in 0..h {
        for sx in 0..w {
            let idx = (sy * w + sx) as usize;
            if visited[idx] || !img.is_opaque(sx, sy) {
                continue;
            }
            // Flood-fill one blob, tracking its extents
            let (mut min_x, mut min_y, mut max_x, mut max_y) = (sx, sy, sx, sy);
            visited[idx] = true;
            stack.push((sx, sy));
            while let Some((x, y)) = stack.pop() {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
                for ny in (y - 1)..=(y + 1) {
                    for nx in (x - 1)..=(x + 1) {
                        if nx < 0 || ny < 0 || nx >= w || ny >= h {
                            continue;
                        }
                        let nidx = (ny * w + nx) as usize;
                        if !visited[nidx] && img.is_opaque(nx, ny) {
                            visited[nidx] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }
            rects.push(PixelRect::new(
                min_x,
                min_y,
                (max_x - min_x + 1) as u32,
                (max_y - min_y + 1) as u32,
            ));
        }
    }
    rects
}

/// Smallest rect containing every opaque pixel inside `cell`, if any
fn opaque_bounds_in(img: &AlphaImage, cell: PixelRect) -> Option<PixelRect> {
    let mut bounds: Option<(i32, i32, i32, i32)> = None;
    for y in cell.y..cell.y + cell.h as i32 {
        for x in cell.x..cell.x + cell.w as i32 {
            if img.is_opaque(x, y) {
                let (min_x, min_y, max_x, max_y) = bounds.unwrap_or((x, y, x, y));
                bounds = Some((min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)));
            }
        }
    }
    bounds.map(|(min_x, min_y, max_x, max_y)| {
        PixelRect::new(min_x, min_y, (max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with_blobs() -> AlphaImage {
        // Two 4x4 blobs well inside a 200x50 sheet, second one further right
        AlphaImage::from_fn(200, 50, |x, y| {
            let in_a = (10..14).contains(&x) && (10..14).contains(&y);
            let in_b = (120..124).contains(&x) && (20..24).contains(&y);
            if in_a || in_b { 255 } else { 0 }
        })
    }

    #[test]
    fn test_alpha_out_of_bounds_is_transparent() {
        let img = AlphaImage::from_fn(4, 4, |_, _| 255);
        assert_eq!(img.alpha_at(-1, 0), 0);
        assert_eq!(img.alpha_at(0, 99), 0);
        assert_eq!(img.alpha_at(3, 3), 255);
    }

    #[test]
    fn test_mask_overlap_basic() {
        let solid = Mask::from_alpha(&AlphaImage::from_fn(8, 8, |_, _| 255));
        let dot = Mask::from_alpha(&AlphaImage::from_fn(1, 1, |_, _| 255));
        assert!(solid.overlap(&dot, (0, 0)));
        assert!(solid.overlap(&dot, (7, 7)));
        assert!(!solid.overlap(&dot, (8, 0)));
        assert!(!solid.overlap(&dot, (-1, -1)));
    }

    #[test]
    fn test_mask_overlap_respects_transparency() {
        // Left half opaque, right half clear
        let half = Mask::from_alpha(&AlphaImage::from_fn(10, 10, |x, _| if x < 5 { 255 } else { 0 }));
        let dot = Mask::from_alpha(&AlphaImage::from_fn(1, 1, |_, _| 255));
        assert!(half.overlap(&dot, (4, 5)));
        assert!(!half.overlap(&dot, (5, 5)));
    }

    #[test]
    fn test_mask_overlap_wide_rows() {
        // Exercise multi-word rows (width > 64)
        let wide = Mask::from_alpha(&AlphaImage::from_fn(100, 2, |x, _| if x == 99 { 255 } else { 0 }));
        let dot = Mask::from_alpha(&AlphaImage::from_fn(1, 1, |_, _| 255));
        assert!(wide.overlap(&dot, (99, 0)));
        assert!(!wide.overlap(&dot, (98, 0)));
    }

    #[test]
    fn test_extract_entities_sorted_and_labelled() {
        let labels = ["A", "B", "C"];
        let entities = extract_entities(&sheet_with_blobs(), &labels);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].rect, PixelRect::new(10, 10, 4, 4));
        assert_eq!(entities[1].rect, PixelRect::new(120, 20, 4, 4));
        assert_eq!(entities[0].label, "A");
        assert_eq!(entities[1].label, "B");
        assert!(entities.iter().all(|e| e.active));
        assert_eq!(entities[0].mask.count(), 16);
    }

    #[test]
    fn test_extract_entities_label_cycling() {
        // Three blobs, two labels: third blob wraps back to the first label
        let sheet = AlphaImage::from_fn(300, 20, |x, y| {
            if y == 5 && (x == 20 || x == 120 || x == 220) { 255 } else { 0 }
        });
        let entities = extract_entities(&sheet, &["one", "two"]);
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[2].label, "one");
    }

    #[test]
    fn test_extract_entities_skips_placeholder_sheets() {
        let tiny = AlphaImage::from_fn(100, 100, |_, _| 255);
        assert!(extract_entities(&tiny, &["A"]).is_empty());
        assert!(extract_entities(&AlphaImage::placeholder(), &["A"]).is_empty());
    }

    #[test]
    fn test_diagonal_pixels_form_one_region() {
        let sheet = AlphaImage::from_fn(150, 10, |x, y| {
            if (x == 50 && y == 5) || (x == 51 && y == 6) { 255 } else { 0 }
        });
        let entities = extract_entities(&sheet, &["A"]);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].rect, PixelRect::new(50, 5, 2, 2));
    }

    #[test]
    fn test_split_frames_crops_each_cell() {
        // Two 20px cells, each with a small blob at a different offset
        let sheet = AlphaImage::from_fn(40, 20, |x, y| {
            let in_a = (2..6).contains(&x) && (10..14).contains(&y);
            let in_b = (25..28).contains(&x) && (3..9).contains(&y);
            if in_a || in_b { 255 } else { 0 }
        });
        let frames = split_frames(&sheet, 2);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].rect, PixelRect::new(2, 10, 4, 4));
        assert_eq!(frames[1].rect, PixelRect::new(25, 3, 3, 6));
    }

    #[test]
    fn test_split_frames_empty_cell_keeps_full_cell() {
        let sheet = AlphaImage::from_fn(40, 10, |x, _| if x < 20 { 255 } else { 0 });
        let frames = split_frames(&sheet, 2);
        assert_eq!(frames[1].rect, PixelRect::new(20, 0, 20, 10));
        assert_eq!(frames[1].mask.count(), 0);
    }
}
