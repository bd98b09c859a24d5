use ratatui::layout::Rect;

pub const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn inner_width(area: Rect) -> usize {
    area.width.saturating_sub(2) as usize
}

pub fn inner_height(area: Rect) -> usize {
    area.height.saturating_sub(2) as usize
}

/// Single-line view of an input field: a window of `max_width` characters
/// centered on the cursor, plus the cursor column inside that window.
pub fn input_view(input: &str, cursor: usize, max_width: usize) -> (String, usize) {
    if max_width == 0 {
        return (String::new(), 0);
    }
    let chars: Vec<char> = input.chars().collect();
    let cursor = input[..cursor.min(input.len())].chars().count();
    if chars.len() <= max_width {
        return (chars.iter().collect(), cursor);
    }
    let mut start = cursor.saturating_sub(max_width / 2);
    if start + max_width > chars.len() {
        start = chars.len() - max_width;
    }
    let view: String = chars[start..start + max_width].iter().collect();
    (view, cursor - start)
}

/// Centered overlay rectangle for modal dialogs.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
