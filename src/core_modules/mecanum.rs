// THEORY:
// The `mecanum` module is the control half of the robot core: the kinematics of
// a four-wheel omnidirectional drivetrain in the "X" configuration. It maps a
// motion intent (desired speed, heading, and rotation) into four normalized
// wheel powers.
//
// Characteristic equations, with phi = heading + pi/4:
//   front_left  = speed * sin(phi) + rotation
//   front_right = speed * cos(phi) - rotation
//   back_left   = speed * cos(phi) + rotation
//   back_right  = speed * sin(phi) - rotation
//
// Key architectural principles:
// 1.  **Pure Function**: No state, no side effects, total over the real domain.
//     A heading outside [0, 2pi) is mathematically valid (sin/cos are periodic)
//     and is not rejected.
// 2.  **Ratio-Preserving Clamp**: When the raw values exceed unit magnitude, all
//     four are divided by the largest magnitude. Clamping a single wheel on its
//     own would bend the motion vector the caller asked for; a uniform rescale
//     keeps the direction and the relative wheel ratios intact.
// 3.  **External Actuation**: The mapping of the four logical wheel names to
//     physical motor identifiers belongs to the hardware layer above.

use std::f64::consts::FRAC_PI_4;

/// A requested drivetrain motion for one control tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// Desired robot speed, [-1, 1].
    pub speed: f64,
    /// Desired velocity angle in radians; 0 is straight ahead.
    pub heading: f64,
    /// Desired rotational speed, [-1, 1].
    pub rotation: f64,
}

impl Motion {
    pub fn new(speed: f64, heading: f64, rotation: f64) -> Self {
        Self {
            speed,
            heading,
            rotation,
        }
    }

    /// Builds a motion intent from a gamepad: the left stick's deflection
    /// becomes speed and heading, the right stick's x axis becomes rotation.
    pub fn from_joystick(stick_x: f64, stick_y: f64, turn: f64) -> Self {
        Self {
            speed: stick_x.hypot(stick_y),
            heading: stick_y.atan2(stick_x),
            rotation: turn,
        }
    }

    /// The wheel powers realizing this motion.
    pub fn to_wheels(&self) -> Wheels {
        motion_to_wheels(self.speed, self.heading, self.rotation)
    }
}

/// The four wheel powers, each in [-1, 1] after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wheels {
    pub front_left: f64,
    pub front_right: f64,
    pub back_left: f64,
    pub back_right: f64,
}

/// Gets the wheel powers corresponding to the desired motion.
pub fn motion_to_wheels(speed: f64, heading: f64, rotation: f64) -> Wheels {
    let phi = heading + FRAC_PI_4;
    let mut powers = [
        speed * phi.sin() + rotation,
        speed * phi.cos() - rotation,
        speed * phi.cos() + rotation,
        speed * phi.sin() - rotation,
    ];
    clamp_powers(&mut powers);
    Wheels {
        front_left: powers[0],
        front_right: powers[1],
        back_left: powers[2],
        back_right: powers[3],
    }
}

/// Clamps the powers to unit magnitude while maintaining their ratios.
fn clamp_powers(powers: &mut [f64; 4]) {
    let max_magnitude = powers.iter().map(|p| p.abs()).fold(0.0, f64::max);
    if max_magnitude > 1.0 {
        for power in powers.iter_mut() {
            *power /= max_magnitude;
        }
    }
}
