use crate::agent::Agent;
use crate::evolution::GenerationStats;
use crate::level::Level;
use crate::physics::{HasHitbox, Rect, Vec2};
use macroquad::prelude::{
    clear_background, draw_line, draw_rectangle, draw_rectangle_lines, draw_text, Color, DARKGRAY,
    GOLD, GRAY, GREEN, RED, WHITE,
};

/// Default window size
pub const SCREEN_WIDTH: f32 = 800.0;
pub const SCREEN_HEIGHT: f32 = 600.0;

const SKY_COLOR: Color = Color::new(0.53, 0.81, 0.92, 1.0);
const PLATFORM_COLOR: Color = GREEN;
const AGENT_COLOR: Color = Color::new(0.1, 0.1, 0.45, 0.8);
const LEADER_COLOR: Color = GOLD;
const DEAD_COLOR: Color = Color::new(0.4, 0.4, 0.4, 0.5);
const GOAL_COLOR: Color = RED;

/// Viewport onto the world: its top-left corner in world coordinates and its size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    pub view_width: f32,
    pub view_height: f32,
}

impl Camera {
    pub fn new(view_width: f32, view_height: f32) -> Self {
        Self {
            offset: Vec2::default(),
            view_width,
            view_height,
        }
    }

    /// Center on `target`, then clamp so the view never leaves `bounds`.
    ///
    /// On an axis where the level is smaller than the view, the view is pinned
    /// to the level's left/top edge.
    pub fn follow(&mut self, target: &impl HasHitbox, bounds: Option<Rect>) {
        let center = target.hitbox().center();
        let mut x = center.x - self.view_width / 2.0;
        let mut y = center.y - self.view_height / 2.0;

        if let Some(bounds) = bounds {
            x = clamp_axis(x, bounds.left(), bounds.right(), self.view_width);
            y = clamp_axis(y, bounds.top(), bounds.bottom(), self.view_height);
        }
        self.offset = Vec2::new(x, y);
    }

    pub fn world_to_screen(&self, point: Vec2) -> Vec2 {
        point - self.offset
    }

    /// Whether any part of `rect` falls inside the view
    pub fn is_visible(&self, rect: &Rect) -> bool {
        Rect::new(self.offset.x, self.offset.y, self.view_width, self.view_height).overlaps(rect)
    }
}

fn clamp_axis(value: f32, min: f32, max: f32, view: f32) -> f32 {
    if max - min <= view {
        min
    } else {
        value.clamp(min, max - view)
    }
}

fn draw_world_rect(camera: &Camera, rect: &Rect, color: Color) {
    if !camera.is_visible(rect) {
        return;
    }
    let top_left = camera.world_to_screen(Vec2::new(rect.x, rect.y));
    draw_rectangle(top_left.x, top_left.y, rect.width, rect.height, color);
}

/// Draw platforms, the goal line and every agent. The leader is outlined.
pub fn draw_world(
    camera: &Camera,
    level: &Level,
    agents: &[Agent],
    leader: Option<&Agent>,
    goal_x: f32,
) {
    clear_background(SKY_COLOR);

    for platform in &level.platforms {
        draw_world_rect(camera, platform, PLATFORM_COLOR);
    }

    let goal = camera.world_to_screen(Vec2::new(goal_x, 0.0));
    if (0.0..=camera.view_width).contains(&goal.x) {
        draw_line(goal.x, 0.0, goal.x, camera.view_height, 2.0, GOAL_COLOR);
    }

    for agent in agents {
        let color = if agent.alive { AGENT_COLOR } else { DEAD_COLOR };
        draw_world_rect(camera, &agent.hitbox(), color);
    }

    if let Some(leader) = leader {
        let hitbox = leader.hitbox();
        let top_left = camera.world_to_screen(Vec2::new(hitbox.x, hitbox.y));
        draw_rectangle_lines(
            top_left.x,
            top_left.y,
            hitbox.width,
            hitbox.height,
            3.0,
            LEADER_COLOR,
        );
    }
}

/// Draw the HUD overlay with generation info
pub fn draw_hud(
    generation: u32,
    best_fitness: Option<f32>,
    tick: u32,
    generation_ticks: u32,
    speed: u32,
) {
    let best = best_fitness.map_or_else(|| "-".to_string(), |f| format!("{f:.3}"));
    let text = format!(
        "Gen: {generation}  Best: {best}  Tick: {tick}/{generation_ticks}  Speed: {speed}x"
    );
    draw_rectangle(0.0, 0.0, SCREEN_WIDTH, 28.0, Color::new(0.0, 0.0, 0.0, 0.4));
    draw_text(&text, 10.0, 20.0, 20.0, WHITE);
}

/// Key help along the bottom edge
pub fn draw_help(screen_h: f32) {
    draw_text("TAB: stats  UP/DOWN: speed  R: restart", 10.0, screen_h - 10.0, 16.0, GRAY);
}

/// Best and average fitness over generations
pub fn draw_fitness_graph(history: &[GenerationStats], screen_w: f32, screen_h: f32) {
    if history.is_empty() {
        return;
    }

    let graph_x = 50.0;
    let graph_y = 200.0;
    let graph_w = screen_w - 100.0;
    let graph_h = screen_h - 240.0;

    draw_line(graph_x, graph_y, graph_x, graph_y + graph_h, 1.0, DARKGRAY);
    draw_line(graph_x, graph_y + graph_h, graph_x + graph_w, graph_y + graph_h, 1.0, DARKGRAY);
    draw_text("Fitness", graph_x - 10.0, graph_y - 5.0, 16.0, GRAY);
    draw_text("Generation", graph_x + graph_w - 70.0, graph_y + graph_h + 20.0, 16.0, GRAY);

    // Fitness may go negative, so scale over the full observed range
    let max = history.iter().map(|s| s.best_fitness).fold(1.0, f32::max);
    let min = history.iter().map(|s| s.avg_fitness).fold(0.0, f32::min);
    let x_scale = graph_w / history.len().max(2).saturating_sub(1) as f32;
    let y_scale = graph_h / (max - min);
    let to_y = |f: f32| graph_y + graph_h - (f - min) * y_scale;

    for (series, color) in [
        (history.iter().map(|s| s.best_fitness).collect::<Vec<_>>(), GREEN),
        (history.iter().map(|s| s.avg_fitness).collect::<Vec<_>>(), SKY_COLOR),
    ] {
        for i in 1..series.len() {
            let x1 = graph_x + (i - 1) as f32 * x_scale;
            let x2 = graph_x + i as f32 * x_scale;
            draw_line(x1, to_y(series[i - 1]), x2, to_y(series[i]), 2.0, color);
        }
    }

    // Goal reached
    if min < 1.0 && max >= 1.0 {
        draw_line(graph_x, to_y(1.0), graph_x + graph_w, to_y(1.0), 1.0, GOAL_COLOR);
    }

    let legend_x = graph_x + graph_w - 150.0;
    for (row, (label, color)) in [("Best", GREEN), ("Avg", SKY_COLOR)].into_iter().enumerate() {
        let y = graph_y + 10.0 + 20.0 * row as f32;
        draw_line(legend_x, y, legend_x + 20.0, y, 2.0, color);
        draw_text(label, legend_x + 25.0, y + 5.0, 16.0, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
    }

    fn box_at(x: f32, y: f32) -> Rect {
        Rect::new(x, y, 20.0, 20.0)
    }

    fn world() -> Option<Rect> {
        Some(Rect::new(0.0, 0.0, 2000.0, 1200.0))
    }

    #[test]
    fn camera_centers_target_mid_level() {
        let mut camera = Camera::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        camera.follow(&box_at(990.0, 590.0), world());
        assert!(approx_eq(camera.offset, Vec2::new(600.0, 300.0)));
        assert!(approx_eq(
            camera.world_to_screen(Vec2::new(1000.0, 600.0)),
            Vec2::new(400.0, 300.0)
        ));
    }

    #[test]
    fn camera_clamps_at_level_edges() {
        let mut camera = Camera::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        camera.follow(&box_at(5.0, 5.0), world());
        assert!(approx_eq(camera.offset, Vec2::new(0.0, 0.0)));

        camera.follow(&box_at(1990.0, 1190.0), world());
        assert!(approx_eq(camera.offset, Vec2::new(1200.0, 600.0)));
    }

    #[test]
    fn small_level_pins_to_origin() {
        let mut camera = Camera::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        let small = Some(Rect::new(50.0, 100.0, 300.0, 200.0));
        camera.follow(&box_at(250.0, 200.0), small);
        assert!(approx_eq(camera.offset, Vec2::new(50.0, 100.0)));
    }

    #[test]
    fn unbounded_camera_just_follows() {
        let mut camera = Camera::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        camera.follow(&box_at(-990.0, -10.0), None);
        assert!(approx_eq(camera.offset, Vec2::new(-1380.0, -300.0)));
    }

    #[test]
    fn visibility_uses_view_rect() {
        let mut camera = Camera::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        camera.follow(&box_at(0.0, 0.0), world());
        assert!(camera.is_visible(&box_at(700.0, 500.0)));
        assert!(!camera.is_visible(&box_at(900.0, 0.0)));
        // Touching the right edge is not inside
        assert!(!camera.is_visible(&box_at(800.0, 0.0)));
    }
}
