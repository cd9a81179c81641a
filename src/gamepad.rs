//! Physical gamepad state shapes: buttons, axes and hats

use bitflags::bitflags;

bitflags! {
    /// Direction a hat (D-pad style digital control) is held in.
    ///
    /// The empty set is centered; diagonals are unions of two cardinals.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HatDirection: u8 {
        const UP = 1;
        const RIGHT = 2;
        const DOWN = 4;
        const LEFT = 8;
    }
}

impl HatDirection {
    /// Centered hat (no direction held).
    pub const CENTER: HatDirection = HatDirection::empty();

    /// The four cardinal directions, in binding-table order.
    pub const CARDINALS: [HatDirection; 4] = [
        HatDirection::UP,
        HatDirection::RIGHT,
        HatDirection::DOWN,
        HatDirection::LEFT,
    ];

    pub(crate) fn label(self) -> Option<&'static str> {
        if self == HatDirection::UP {
            Some("up")
        } else if self == HatDirection::RIGHT {
            Some("right")
        } else if self == HatDirection::DOWN {
            Some("down")
        } else if self == HatDirection::LEFT {
            Some("left")
        } else {
            None
        }
    }

    pub(crate) fn from_label(label: &str) -> Option<HatDirection> {
        match label {
            "up" => Some(HatDirection::UP),
            "right" => Some(HatDirection::RIGHT),
            "down" => Some(HatDirection::DOWN),
            "left" => Some(HatDirection::LEFT),
            _ => None,
        }
    }
}

/// Which side of its center an axis has been pushed past the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisDirection {
    Positive,
    Negative,
}

impl AxisDirection {
    pub(crate) fn label(self) -> &'static str {
        match self {
            AxisDirection::Positive => "+",
            AxisDirection::Negative => "-",
        }
    }

    pub(crate) fn from_label(label: &str) -> Option<AxisDirection> {
        match label {
            "+" => Some(AxisDirection::Positive),
            "-" => Some(AxisDirection::Negative),
            _ => None,
        }
    }
}

/// A live, polled gamepad exposing its raw control vectors.
///
/// Implementations are snapshots refreshed by their driver's `update`; a pad
/// may appear or disappear between polls.
pub trait Gamepad: Send + Sync {
    /// Name suitable for display in a picker.
    fn visible_name(&self) -> String;

    /// Stable name used for preferred-device persistence.
    fn name(&self) -> String {
        self.visible_name()
    }

    /// Current state of every button, indexed by button number.
    fn buttons(&self) -> &[bool];

    /// Current raw value of every axis, indexed by axis number.
    fn axes(&self) -> &[i32];

    /// Current direction of every hat, indexed by hat number.
    fn hats(&self) -> &[HatDirection];
}
