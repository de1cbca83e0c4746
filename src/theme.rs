use ratatui::style::Color;

pub struct Theme {
    // Pane borders
    pub pane_active_border: Color,
    pub pane_inactive_border: Color,
    pub pane_path: Color,

    // File list
    pub directory_fg: Color,
    pub file_fg: Color,
    pub index_fg: Color,

    // Highlight
    pub cursor_active_fg: Color,
    pub cursor_active_bg: Color,
    pub cursor_inactive_fg: Color,
    pub cursor_inactive_bg: Color,

    // Dialogs
    pub dialog_bg: Color,
    pub dialog_border: Color,
    pub dialog_delete_border: Color,
    pub dialog_error_border: Color,
    pub dialog_input_fg: Color,
    pub dialog_input_bg: Color,
    pub dialog_hint: Color,
    pub dialog_shadow: Color,
    pub dialog_button_fg: Color,
    pub dialog_button_bg: Color,
    pub dialog_button_focus_bg: Color,

    // Debug view
    pub debug_fg: Color,
}

// Tokyo Night inspired color palette
pub const THEME: Theme = Theme {
    pane_active_border: Color::Rgb(122, 162, 247),    // #7aa2f7 - soft blue
    pane_inactive_border: Color::Rgb(86, 95, 137),    // #565f89 - muted gray
    pane_path: Color::Rgb(224, 175, 104),             // #e0af68 - muted yellow

    directory_fg: Color::Rgb(247, 118, 142),          // #f7768e - soft red
    file_fg: Color::Rgb(169, 177, 214),               // #a9b1d6 - light gray
    index_fg: Color::Rgb(224, 175, 104),              // #e0af68 - muted yellow

    cursor_active_fg: Color::Rgb(26, 27, 38),         // #1a1b26 - dark bg
    cursor_active_bg: Color::Rgb(122, 162, 247),      // #7aa2f7 - soft blue
    cursor_inactive_fg: Color::Rgb(169, 177, 214),    // #a9b1d6 - light gray
    cursor_inactive_bg: Color::Rgb(41, 46, 66),       // #292e42 - dark highlight

    dialog_bg: Color::Rgb(26, 27, 38),                // #1a1b26 - dark bg
    dialog_border: Color::Rgb(122, 162, 247),         // #7aa2f7 - soft blue
    dialog_delete_border: Color::Rgb(247, 118, 142),  // #f7768e - soft red
    dialog_error_border: Color::Rgb(224, 175, 104),   // #e0af68 - muted orange
    dialog_input_fg: Color::Rgb(169, 177, 214),       // #a9b1d6 - light gray
    dialog_input_bg: Color::Rgb(41, 46, 66),          // #292e42 - dark highlight
    dialog_hint: Color::Rgb(86, 95, 137),             // #565f89 - muted gray
    dialog_shadow: Color::Rgb(15, 15, 20),            // #0f0f14 - very dark
    dialog_button_fg: Color::Rgb(169, 177, 214),      // #a9b1d6 - light gray
    dialog_button_bg: Color::Rgb(56, 62, 87),         // #383e57 - button bg
    dialog_button_focus_bg: Color::Rgb(122, 162, 247), // #7aa2f7 - soft blue

    debug_fg: Color::Rgb(158, 206, 106),              // #9ece6a - soft green
};
