use serde::Serialize;

/// Keyboard-style input source sampled once per tick.
pub trait ControlInput {
    fn is_down(&self) -> bool;
    fn is_left(&self) -> bool;
    fn is_right(&self) -> bool;
    fn is_space(&self) -> bool;

    fn any_thrust_key(&self) -> bool {
        self.is_down() || self.is_left() || self.is_right()
    }
}

/// Plain snapshot of the four keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub space: bool,
}

impl Controls {
    pub fn with_down(self, down: bool) -> Self {
        Self { down, ..self }
    }

    pub fn with_left(self, left: bool) -> Self {
        Self { left, ..self }
    }

    pub fn with_right(self, right: bool) -> Self {
        Self { right, ..self }
    }

    pub fn with_space(self, space: bool) -> Self {
        Self { space, ..self }
    }
}

impl ControlInput for Controls {
    fn is_down(&self) -> bool {
        self.down
    }

    fn is_left(&self) -> bool {
        self.left
    }

    fn is_right(&self) -> bool {
        self.right
    }

    fn is_space(&self) -> bool {
        self.space
    }
}

/// Which way a side key turns the craft.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlMapping {
    /// Left arrow turns the nose left (counter-clockwise), right arrow turns
    /// it right.
    #[default]
    Natural,
    /// Left arrow fires the clockwise thruster, right arrow the
    /// counter-clockwise one.
    Swapped,
}

/// Thrusters requested for one tick. The three flags are independent, both
/// attitude thrusters may fire at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Thrust {
    main: bool,
    clockwise: bool,
    counter_clockwise: bool,
}

impl Thrust {
    pub fn new(main: bool, clockwise: bool, counter_clockwise: bool) -> Self {
        Self {
            main,
            clockwise,
            counter_clockwise,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_input(input: &impl ControlInput, mapping: ControlMapping) -> Self {
        let (clockwise, counter_clockwise) = match mapping {
            ControlMapping::Natural => (input.is_right(), input.is_left()),
            ControlMapping::Swapped => (input.is_left(), input.is_right()),
        };
        Self {
            main: input.is_down(),
            clockwise,
            counter_clockwise,
        }
    }

    pub fn is_main(&self) -> bool {
        self.main
    }

    pub fn is_clockwise(&self) -> bool {
        self.clockwise
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.counter_clockwise
    }

    pub fn is_idle(&self) -> bool {
        !(self.main || self.clockwise || self.counter_clockwise)
    }
}

#[cfg(test)]
mod control_tests {
    use super::*;

    #[test]
    fn natural_mapping() {
        let controls = Controls::default().with_down(true).with_left(true);
        let thrust = Thrust::from_input(&controls, ControlMapping::Natural);
        assert!(thrust.is_main());
        assert!(thrust.is_counter_clockwise());
        assert!(!thrust.is_clockwise());
    }

    #[test]
    fn swapped_mapping() {
        let controls = Controls::default().with_left(true);
        let thrust = Thrust::from_input(&controls, ControlMapping::Swapped);
        assert!(!thrust.is_main());
        assert!(thrust.is_clockwise());
        assert!(!thrust.is_counter_clockwise());
    }

    #[test]
    fn both_side_keys_are_independent() {
        let controls = Controls::default().with_left(true).with_right(true);
        let thrust = Thrust::from_input(&controls, ControlMapping::Natural);
        assert!(thrust.is_clockwise() && thrust.is_counter_clockwise());
    }

    #[test]
    fn space_is_not_thrust() {
        let controls = Controls::default().with_space(true);
        assert!(!controls.any_thrust_key());
        assert!(Thrust::from_input(&controls, ControlMapping::Natural).is_idle());
    }
}
