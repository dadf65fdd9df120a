use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub hours_area: Rect,
    pub sidebar_area: Rect,
    pub main_area: Rect,
    pub timetable_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Width: 50 columns leaves room for the subject list (20) and a usable form (30)
    /// Height: 20 lines (3 hours + 9 form + 5 timetable + 1 status + 2 buffer)
    pub const MIN_WIDTH: u16 = 50;
    pub const MIN_HEIGHT: u16 = 20;

    pub fn calculate(size: Rect, sidebar_width_percent: u16) -> Self {
        // Ensure minimum terminal size (accounting for outer border)
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        // Sidebar at least 20 columns, at most 50%, and the form keeps 30
        let requested_width = (inner_area.width * sidebar_width_percent) / 100;
        let max_width = (inner_area.width * 50) / 100;
        let sidebar_width = requested_width
            .max(20)
            .min(max_width)
            .min(inner_area.width.saturating_sub(30));

        // Hours field, subject row, timetable, status
        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(9),
                Constraint::Percentage(40),
                Constraint::Length(1),
            ])
            .split(inner_area);

        let horizontal = RatLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(1)])
            .split(vertical[1]);

        Self {
            inner_area,
            hours_area: vertical[0],
            sidebar_area: horizontal[0],
            main_area: horizontal[1],
            timetable_area: vertical[2],
            status_area: vertical[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fills_inner_area() {
        let layout = Layout::calculate(Rect::new(0, 0, 100, 40), 30);
        assert_eq!(layout.inner_area, Rect::new(1, 1, 98, 38));
        assert_eq!(layout.hours_area.height, 3);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.sidebar_area.width + layout.main_area.width, 98);
        assert_eq!(layout.sidebar_area.width, 29);
        assert!(layout.main_area.height >= 9);
    }

    #[test]
    fn test_small_terminal_is_clamped_to_minimum() {
        let layout = Layout::calculate(Rect::new(0, 0, 10, 5), 30);
        assert_eq!(layout.inner_area.width, Layout::MIN_WIDTH);
        assert_eq!(layout.inner_area.height, Layout::MIN_HEIGHT);
        assert_eq!(layout.sidebar_area.width, 20);
    }
}
