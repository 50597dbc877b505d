// crates/matchline-ui/src/theme.rs
use egui::{Color32, Context, Stroke, Style, Visuals};

// ── Palette ──────────────────────────────────────────────────────────────────
pub const ACCENT:        Color32 = Color32::from_rgb(220,  60,  60);
pub const ACCENT_DIM:    Color32 = Color32::from_rgb(150,  35,  35);
pub const ACCENT_HOVER:  Color32 = Color32::from_rgb(250, 100, 100);

pub const DARK_BG_0:     Color32 = Color32::from_rgb( 40,  40,  40);
pub const DARK_BG_1:     Color32 = Color32::from_rgb( 24,  24,  28);
pub const DARK_BG_2:     Color32 = Color32::from_rgb( 32,  32,  38);
pub const DARK_BG_3:     Color32 = Color32::from_rgb( 44,  44,  52);
pub const DARK_BG_4:     Color32 = Color32::from_rgb( 56,  56,  66);

pub const DARK_TEXT:     Color32 = Color32::from_rgb(220, 220, 230);
pub const DARK_TEXT_DIM: Color32 = Color32::from_rgb(125, 125, 140);
pub const DARK_BORDER:   Color32 = Color32::from_rgb( 58,  58,  70);

pub const CLIP_BODY:     Color32 = Color32::from_rgb(100, 150, 200);
pub const CLIP_ACTIVE:   Color32 = Color32::from_rgb(200, 100, 100);
pub const SELECTION:     Color32 = Color32::from_rgba_premultiplied(200, 200, 0, 80);
pub const SELECTION_EDGE: Color32 = Color32::from_rgb(255, 200, 0);
pub const RULER_BG:      Color32 = Color32::from_rgb( 40,  40,  40);
pub const GUIDE_LINE:    Color32 = Color32::from_rgb( 80,  80,  80);
pub const CUT_LINE:      Color32 = Color32::from_rgb(240, 220,  60);

pub fn configure_style(ctx: &Context) {
    let mut style = Style::default();

    style.spacing.item_spacing     = egui::vec2(6.0, 5.0);
    style.spacing.button_padding   = egui::vec2(10.0, 5.0);
    style.spacing.scroll.bar_width = 8.0;

    let cr = egui::CornerRadius::same(4);

    let mut v = Visuals::dark();
    v.panel_fill       = DARK_BG_1;
    v.window_fill      = DARK_BG_2;
    v.faint_bg_color   = DARK_BG_0;
    v.extreme_bg_color = DARK_BG_0;
    v.window_stroke    = Stroke::new(1.0, DARK_BORDER);

    v.selection.bg_fill = ACCENT_DIM;
    v.selection.stroke  = Stroke::new(1.0, Color32::BLACK);
    v.hyperlink_color   = ACCENT_HOVER;

    v.widgets.noninteractive.bg_fill       = DARK_BG_2;
    v.widgets.noninteractive.bg_stroke     = Stroke::new(1.0, DARK_BORDER);
    v.widgets.noninteractive.fg_stroke     = Stroke::new(1.0, DARK_TEXT_DIM);
    v.widgets.noninteractive.corner_radius = cr;

    v.widgets.inactive.bg_fill       = DARK_BG_3;
    v.widgets.inactive.bg_stroke     = Stroke::new(1.0, DARK_BORDER);
    v.widgets.inactive.fg_stroke     = Stroke::new(1.0, DARK_TEXT);
    v.widgets.inactive.corner_radius = cr;

    v.widgets.hovered.bg_fill       = DARK_BG_4;
    v.widgets.hovered.bg_stroke     = Stroke::new(1.0, ACCENT_DIM);
    v.widgets.hovered.fg_stroke     = Stroke::new(1.5, ACCENT_HOVER);
    v.widgets.hovered.corner_radius = cr;

    v.widgets.active.bg_fill       = ACCENT_DIM;
    v.widgets.active.bg_stroke     = Stroke::new(1.0, ACCENT);
    v.widgets.active.fg_stroke     = Stroke::new(2.0, Color32::WHITE);
    v.widgets.active.corner_radius = cr;

    v.override_text_color = Some(DARK_TEXT);

    ctx.set_visuals(v);
    ctx.set_style(style);
}
