use crate::chromosome::Action;
use serde::{Deserialize, Serialize};

/// Agent hitbox width in world units
pub const HITBOX_WIDTH: f32 = 34.0;

/// Agent hitbox height in world units
pub const HITBOX_HEIGHT: f32 = 57.0;

/// Downward acceleration applied every tick (units per tick squared)
pub const GRAVITY: f32 = 0.35;

/// Upward velocity given by a jump (units per tick)
pub const JUMP_IMPULSE: f32 = 11.0;

/// Horizontal displacement of a move action (units per tick)
pub const MOVE_SPEED: f32 = 4.5;

/// 2D vector type. `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Axis-aligned rectangle in world coordinates, anchored at its top-left corner
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap test: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Anything that occupies an axis-aligned box in the world
pub trait HasHitbox {
    fn hitbox(&self) -> Rect;
}

impl HasHitbox for Rect {
    fn hitbox(&self) -> Rect {
        *self
    }
}

/// Kinematic state of one agent
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsState {
    /// Top-left corner of the hitbox
    pub position: Vec2,
    pub velocity_y: f32,
    pub grounded: bool,
}

impl PhysicsState {
    /// A body at rest at `position`, not yet known to be standing on anything
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity_y: 0.0,
            grounded: false,
        }
    }

    /// A body at rest at `position`, grounded if its feet sit exactly on a platform top
    pub fn resting(position: Vec2, platforms: &[Rect]) -> Self {
        let mut state = Self::at(position);
        let feet = state.hitbox();
        state.grounded = platforms.iter().any(|p| {
            feet.bottom() == p.top() && feet.left() < p.right() && feet.right() > p.left()
        });
        state
    }

    pub fn hitbox(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, HITBOX_WIDTH, HITBOX_HEIGHT)
    }

    fn set_right(&mut self, right: f32) {
        self.position.x = right - HITBOX_WIDTH;
    }

    fn set_left(&mut self, left: f32) {
        self.position.x = left;
    }

    fn set_bottom(&mut self, bottom: f32) {
        self.position.y = bottom - HITBOX_HEIGHT;
    }

    fn set_top(&mut self, top: f32) {
        self.position.y = top;
    }
}

/// Which platform wins when the hitbox overlaps several during vertical resolution
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalTieBreak {
    /// Falling lands on the highest top, rising bumps the lowest bottom.
    #[default]
    Nearest,
    /// The first overlapping platform in list order.
    FirstInList,
}

/// Tunable constants for a [`PhysicsBody`]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    pub gravity: f32,
    pub jump_impulse: f32,
    pub move_speed: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_impulse: JUMP_IMPULSE,
            move_speed: MOVE_SPEED,
        }
    }
}

/// Integrates one agent for one tick against a static platform set.
///
/// Horizontal motion is applied and resolved before gravity, so in a corner
/// collision the horizontal axis is settled first and the vertical axis has the
/// final say on position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhysicsBody {
    pub params: PhysicsParams,
    pub tie_break: VerticalTieBreak,
}

impl PhysicsBody {
    pub fn new(params: PhysicsParams, tie_break: VerticalTieBreak) -> Self {
        Self { params, tie_break }
    }

    /// Advance `state` by one tick. Pure: the same inputs always give the same output.
    pub fn step(&self, state: &PhysicsState, action: Action, platforms: &[Rect]) -> PhysicsState {
        let mut next = *state;

        match action {
            Action::MoveLeft => next.position.x -= self.params.move_speed,
            Action::MoveRight => next.position.x += self.params.move_speed,
            Action::Jump => {
                if next.grounded {
                    next.velocity_y = -self.params.jump_impulse;
                    next.grounded = false;
                }
            }
            Action::Idle => {}
        }

        resolve_horizontal(&mut next, platforms);

        next.velocity_y += self.params.gravity;
        next.position.y += next.velocity_y;

        self.resolve_vertical(&mut next, platforms);
        next
    }

    fn resolve_vertical(&self, state: &mut PhysicsState, platforms: &[Rect]) {
        state.grounded = false;
        if state.velocity_y == 0.0 {
            return;
        }

        let hitbox = state.hitbox();
        let mut hits = platforms.iter().filter(|p| hitbox.overlaps(p));
        let chosen = match self.tie_break {
            VerticalTieBreak::FirstInList => hits.next(),
            VerticalTieBreak::Nearest if state.velocity_y > 0.0 => {
                hits.min_by(|a, b| a.top().total_cmp(&b.top()))
            }
            VerticalTieBreak::Nearest => hits.max_by(|a, b| a.bottom().total_cmp(&b.bottom())),
        };

        let Some(platform) = chosen else {
            return;
        };

        if state.velocity_y > 0.0 {
            state.set_bottom(platform.top());
            state.velocity_y = 0.0;
            state.grounded = true;
        } else {
            state.set_top(platform.bottom());
            state.velocity_y = 0.0;
        }
    }
}

/// Push the hitbox out of any platform whose vertical edge it has crossed.
fn resolve_horizontal(state: &mut PhysicsState, platforms: &[Rect]) {
    for platform in platforms {
        let hitbox = state.hitbox();
        if !hitbox.overlaps(platform) {
            continue;
        }
        if hitbox.right() > platform.left() && platform.left() > hitbox.left() {
            state.set_right(platform.left());
        } else if hitbox.left() < platform.right() && platform.right() < hitbox.right() {
            state.set_left(platform.right());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn body() -> PhysicsBody {
        PhysicsBody::default()
    }

    fn floor() -> Rect {
        Rect::new(-1000.0, 500.0, 4000.0, 20.0)
    }

    /// Standing exactly on top of `floor()`
    fn resting_on_floor(x: f32) -> PhysicsState {
        PhysicsState {
            position: Vec2::new(x, 500.0 - HITBOX_HEIGHT),
            velocity_y: 0.0,
            grounded: true,
        }
    }

    // --- Rect ---

    #[test]
    fn rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Vec2::new(25.0, 40.0));
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
        assert!(a.overlaps(&Rect::new(9.0, 9.0, 10.0, 10.0)));
    }

    #[test]
    fn resting_state_detects_support() {
        let on_floor = PhysicsState::resting(Vec2::new(0.0, 500.0 - HITBOX_HEIGHT), &[floor()]);
        assert!(on_floor.grounded);
        let hovering = PhysicsState::resting(Vec2::new(0.0, 400.0), &[floor()]);
        assert!(!hovering.grounded);
        let beside = PhysicsState::resting(Vec2::new(3000.0, 500.0 - HITBOX_HEIGHT), &[floor()]);
        assert!(!beside.grounded);
    }

    // --- Free fall ---

    #[test]
    fn gravity_accumulates_without_platforms() {
        let mut state = PhysicsState::at(Vec2::new(0.0, 0.0));
        state = body().step(&state, Action::Idle, &[]);
        assert!(approx_eq(state.velocity_y, GRAVITY));
        assert!(approx_eq(state.position.y, GRAVITY));
        state = body().step(&state, Action::Idle, &[]);
        assert!(approx_eq(state.velocity_y, 2.0 * GRAVITY));
        assert!(approx_eq(state.position.y, 3.0 * GRAVITY));
        assert!(!state.grounded);
    }

    #[test]
    fn step_is_deterministic() {
        let platforms = [floor(), Rect::new(200.0, 300.0, 50.0, 200.0)];
        let start = PhysicsState {
            position: Vec2::new(150.0, 380.0),
            velocity_y: -3.0,
            grounded: false,
        };
        for action in Action::ALL {
            let a = body().step(&start, action, &platforms);
            let b = body().step(&start, action, &platforms);
            assert_eq!(a, b);
        }
    }

    // --- Landing ---

    #[test]
    fn falling_agent_lands_on_platform_below() {
        let mut state = PhysicsState::at(Vec2::new(0.0, 400.0));
        for _ in 0..200 {
            state = body().step(&state, Action::Idle, &[floor()]);
        }
        assert!(approx_eq(state.position.y + HITBOX_HEIGHT, floor().top()));
        assert_eq!(state.velocity_y, 0.0);
        assert!(state.grounded);
        assert!(!state.hitbox().overlaps(&floor()));
    }

    #[test]
    fn resting_agent_stays_grounded() {
        let state = resting_on_floor(0.0);
        let next = body().step(&state, Action::Idle, &[floor()]);
        assert_eq!(next, state);
    }

    // --- Horizontal movement and walls ---

    #[test]
    fn move_right_and_left_shift_by_speed() {
        let state = resting_on_floor(100.0);
        let right = body().step(&state, Action::MoveRight, &[floor()]);
        assert!(approx_eq(right.position.x, 100.0 + MOVE_SPEED));
        let left = body().step(&state, Action::MoveLeft, &[floor()]);
        assert!(approx_eq(left.position.x, 100.0 - MOVE_SPEED));
        assert!(right.grounded && left.grounded);
    }

    #[test]
    fn wall_clamps_right_edge_when_moving_right() {
        let wall = Rect::new(136.0, 300.0, 20.0, 200.0);
        let state = resting_on_floor(100.0);
        let next = body().step(&state, Action::MoveRight, &[floor(), wall]);
        assert!(approx_eq(next.hitbox().right(), wall.left()));
        assert!(next.grounded);
    }

    #[test]
    fn wall_clamps_left_edge_when_moving_left() {
        let wall = Rect::new(80.0, 300.0, 18.0, 200.0);
        let state = resting_on_floor(100.0);
        let next = body().step(&state, Action::MoveLeft, &[floor(), wall]);
        assert!(approx_eq(next.hitbox().left(), wall.right()));
    }

    #[test]
    fn horizontal_clamp_leaves_vertical_velocity() {
        let wall = Rect::new(136.0, 0.0, 20.0, 1000.0);
        let state = PhysicsState {
            position: Vec2::new(100.0, 100.0),
            velocity_y: -4.0,
            grounded: false,
        };
        let next = body().step(&state, Action::MoveRight, &[wall]);
        assert!(approx_eq(next.hitbox().right(), wall.left()));
        assert!(approx_eq(next.velocity_y, -4.0 + GRAVITY));
    }

    // --- Jumping ---

    #[test]
    fn jump_from_ground_sets_impulse() {
        let state = resting_on_floor(0.0);
        let next = body().step(&state, Action::Jump, &[floor()]);
        assert!(approx_eq(next.velocity_y, -JUMP_IMPULSE + GRAVITY));
        assert!(next.position.y < state.position.y);
        assert!(!next.grounded);
    }

    #[test]
    fn jump_while_airborne_is_ignored() {
        let state = PhysicsState {
            position: Vec2::new(0.0, 100.0),
            velocity_y: 2.0,
            grounded: false,
        };
        let jumped = body().step(&state, Action::Jump, &[floor()]);
        let idle = body().step(&state, Action::Idle, &[floor()]);
        assert_eq!(jumped, idle);
        assert!(approx_eq(jumped.velocity_y, 2.0 + GRAVITY));
    }

    #[test]
    fn rising_agent_bumps_ceiling() {
        let ceiling = Rect::new(0.0, 0.0, 200.0, 50.0);
        let state = PhysicsState {
            position: Vec2::new(10.0, 52.0),
            velocity_y: -6.0,
            grounded: false,
        };
        let next = body().step(&state, Action::Idle, &[ceiling]);
        assert!(approx_eq(next.position.y, ceiling.bottom()));
        assert_eq!(next.velocity_y, 0.0);
        assert!(!next.grounded);
    }

    // --- Tie-break policy ---

    fn stacked_platforms() -> [Rect; 2] {
        // Listed lower first so the two policies disagree.
        [
            Rect::new(0.0, 110.0, 100.0, 20.0),
            Rect::new(0.0, 105.0, 100.0, 20.0),
        ]
    }

    fn falling_into_stack() -> PhysicsState {
        PhysicsState {
            position: Vec2::new(10.0, 100.0 - HITBOX_HEIGHT),
            velocity_y: 12.0,
            grounded: false,
        }
    }

    #[test]
    fn nearest_tie_break_lands_on_highest_top() {
        let platforms = stacked_platforms();
        let next = body().step(&falling_into_stack(), Action::Idle, &platforms);
        assert!(approx_eq(next.hitbox().bottom(), 105.0));
        assert!(platforms.iter().all(|p| !next.hitbox().overlaps(p)));
        assert!(next.grounded);
    }

    #[test]
    fn first_in_list_tie_break_uses_list_order() {
        let platforms = stacked_platforms();
        let first = PhysicsBody::new(PhysicsParams::default(), VerticalTieBreak::FirstInList);
        let next = first.step(&falling_into_stack(), Action::Idle, &platforms);
        assert!(approx_eq(next.hitbox().bottom(), 110.0));
        assert!(next.grounded);
    }

    #[test]
    fn nearest_tie_break_bumps_lowest_bottom_when_rising() {
        let platforms = [
            Rect::new(0.0, 0.0, 100.0, 40.0),
            Rect::new(0.0, 0.0, 100.0, 45.0),
        ];
        let state = PhysicsState {
            position: Vec2::new(10.0, 48.0),
            velocity_y: -10.0,
            grounded: false,
        };
        let next = body().step(&state, Action::Idle, &platforms);
        assert!(approx_eq(next.position.y, 45.0));
        assert!(platforms.iter().all(|p| !next.hitbox().overlaps(p)));
    }

    // --- Constants sanity checks ---

    #[test]
    fn default_params_match_constants() {
        let params = PhysicsParams::default();
        assert_eq!(params.gravity, GRAVITY);
        assert_eq!(params.jump_impulse, JUMP_IMPULSE);
        assert_eq!(params.move_speed, MOVE_SPEED);
        assert_eq!(HITBOX_WIDTH, 34.0);
        assert_eq!(HITBOX_HEIGHT, 57.0);
    }
}
