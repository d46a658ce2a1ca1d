use eframe::egui::{self, vec2, Color32, CornerRadius, Pos2, Shape, TextureHandle};
use image::RgbaImage;

use crate::{
    geometry::{Point, Rect},
    highlight::Surface,
    session::Session,
};

/// Collects highlight rectangles as egui shapes positioned over the image.
pub struct EguiSurface {
    origin: Pos2,
    shapes: Vec<Shape>,
}

impl EguiSurface {
    pub fn new(origin: Pos2) -> Self {
        Self {
            origin,
            shapes: Vec::new(),
        }
    }

    pub fn into_shapes(self) -> Vec<Shape> {
        self.shapes
    }
}

impl Surface for EguiSurface {
    fn clear(&mut self) {
        self.shapes.clear();
    }

    fn fill_rect(&mut self, rect: Rect, [r, g, b, a]: [u8; 4]) {
        let min = self.origin + vec2(rect.x, rect.y);
        self.shapes.push(Shape::rect_filled(
            egui::Rect::from_min_size(min, vec2(rect.width, rect.height)),
            CornerRadius::ZERO,
            Color32::from_rgba_unmultiplied(r, g, b, a),
        ));
    }
}

pub fn load_texture(ctx: &egui::Context, image: &RgbaImage) -> TextureHandle {
    let color_image = egui::ColorImage::from_rgba_unmultiplied(
        [image.width() as usize, image.height() as usize],
        image.as_flat_samples().as_slice(),
    );

    ctx.load_texture(
        "ocr image",
        color_image,
        egui::TextureOptions {
            magnification: egui::TextureFilter::Linear,
            minification: egui::TextureFilter::Linear,
            wrap_mode: egui::TextureWrapMode::ClampToEdge,
            mipmap_mode: None,
        },
    )
}

/// Size the image is shown at: as large as fits into `available`, but never upscaled.
pub fn fit_size(image_size: egui::Vec2, available: egui::Vec2) -> egui::Vec2 {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return egui::Vec2::ZERO;
    }
    let scale = (available.x / image_size.x)
        .min(available.y / image_size.y)
        .clamp(0.0, 1.0);
    image_size * scale
}

/// Show the image with its highlight overlay and feed pointer input into the selection.
pub fn image_panel(
    ui: &mut egui::Ui,
    session: &mut Session,
    texture: Option<&TextureHandle>,
    is_loading: bool,
    highlight_colour: [u8; 4],
) {
    let Some(texture) = texture else {
        ui.centered_and_justified(|ui| {
            if is_loading {
                ui.add(egui::Spinner::new().size(48.0));
            } else {
                ui.label("Open an image or drop one onto this window.");
            }
        });
        return;
    };

    let size = fit_size(texture.size_vec2(), ui.available_size());
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
    session.set_rendered_size(rect.width(), rect.height());

    let to_local = |pos: Pos2| Point::new(pos.x - rect.min.x, pos.y - rect.min.y);

    if response.clicked() {
        // press and release without movement: starts and immediately ends an empty drag
        if let Some(pos) = response.interact_pointer_pos() {
            session.drag_start(to_local(pos));
            session.drag_end();
        }
    }

    if response.drag_started_by(egui::PointerButton::Primary) {
        let origin = ui
            .input(|input| input.pointer.press_origin())
            .or(response.interact_pointer_pos());
        if let Some(pos) = origin {
            session.drag_start(to_local(pos));
        }
    }

    if session.is_dragging() {
        let hovering = ui
            .ctx()
            .pointer_hover_pos()
            .is_some_and(|pos| rect.contains(pos));

        if !hovering {
            session.pointer_left();
        } else if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                session.drag_move(to_local(pos));
            }
        }
    }

    if response.drag_stopped() {
        session.drag_end();
    }

    let painter = ui.painter_at(rect);
    painter.image(
        texture.id(),
        rect,
        egui::Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
        Color32::WHITE,
    );

    let mut surface = EguiSurface::new(rect.min);
    session.render_highlights(&mut surface, highlight_colour);
    painter.extend(surface.into_shapes());

    if let Some(drag) = session.selection_rect() {
        let [r, g, b, _] = highlight_colour;
        painter.rect_stroke(
            egui::Rect::from_min_size(rect.min + vec2(drag.x, drag.y), vec2(drag.width, drag.height)),
            CornerRadius::ZERO,
            egui::Stroke::new(1.0, Color32::from_rgb(r, g, b)),
            egui::StrokeKind::Inside,
        );
    }
}
