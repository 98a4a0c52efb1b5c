use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RingError;
use crate::lap_info::GateIndex;

/// What the caller hands in for each gate before the ring is linked up.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GateSpec {
    pub anchor: DVec3,
    // used as-is unless auto_forward is set
    pub forward: DVec3,
    pub auto_forward: bool,
    pub is_lap_flag: bool,
}

impl GateSpec {
    pub fn new(anchor: DVec3, forward: DVec3) -> Self {
        Self {
            anchor,
            forward,
            auto_forward: false,
            is_lap_flag: false,
        }
    }

    pub fn auto(anchor: DVec3) -> Self {
        Self {
            anchor,
            forward: DVec3::Z,
            auto_forward: true,
            is_lap_flag: false,
        }
    }

    pub fn lap_flag(mut self) -> Self {
        self.is_lap_flag = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gate {
    pub index: GateIndex,
    pub anchor: DVec3,
    pub authored_forward: DVec3,
    pub auto_forward: bool,
    pub is_lap_flag: bool,
}

/// The plane a gate spans: through `anchor`, facing `normal` (unit length, or zero if
/// the gate has no usable direction).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GatePlane {
    pub anchor: DVec3,
    pub normal: DVec3,
}

impl GatePlane {
    // Racers count as through the gate once the gate anchor is behind them, so
    // this is a pure position test: no velocity, no previous frame.
    pub fn has_passed(&self, position: DVec3) -> bool {
        (self.anchor - position).dot(self.normal) < 0.0
    }

    pub fn closest_point(&self, position: DVec3) -> DVec3 {
        position - self.normal * (position - self.anchor).dot(self.normal)
    }

    /// Unsigned distance from `position` to the plane. Says nothing about which side
    /// the racer is on.
    pub fn distance_to(&self, position: DVec3) -> f64 {
        position.distance(self.closest_point(position))
    }
}

/// Closed sequence of gates. Links are index arithmetic over one array; gate `i`'s
/// neighbours are `index_mod(i - 1)` and `index_mod(i + 1)`.
#[derive(Clone, Debug)]
pub struct Ring {
    gates: Vec<Gate>,
}

impl Ring {
    pub fn build<I>(specs: I) -> Result<Ring, RingError>
    where
        I: IntoIterator<Item = GateSpec>,
    {
        let specs: Vec<GateSpec> = specs.into_iter().collect();
        if specs.len() < 2 {
            return Err(RingError::Degenerate { count: specs.len() });
        }

        let mut lap_flag: Option<GateIndex> = None;
        for (index, spec) in specs.iter().enumerate() {
            if spec.is_lap_flag {
                if let Some(first) = lap_flag {
                    return Err(RingError::MultipleLapFlags {
                        first,
                        second: index,
                    });
                }
                lap_flag = Some(index);
            }

            let usable = spec.forward.is_finite() && spec.forward.length_squared() > 0.0;
            if !spec.auto_forward && !usable {
                return Err(RingError::InvalidOrientation { index });
            }
        }
        let lap_flag = lap_flag.unwrap_or(0);

        let gates = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| Gate {
                index,
                anchor: spec.anchor,
                authored_forward: spec.forward.normalize_or_zero(),
                auto_forward: spec.auto_forward,
                is_lap_flag: index == lap_flag,
            })
            .collect();
        let mut ring = Ring { gates };

        // A bisector collapses when both neighbours sit on the same spot (always the
        // case with two gates). Such a gate falls back to its authored forward.
        for index in 0..ring.count() {
            if !ring.gates[index].auto_forward || ring.forward(index) != DVec3::ZERO {
                continue;
            }
            if ring.gates[index].authored_forward == DVec3::ZERO {
                return Err(RingError::InvalidOrientation { index });
            }
            debug!(index, "neighbour bisector is zero, using authored forward");
            ring.gates[index].auto_forward = false;
        }

        Ok(ring)
    }

    /// Throws the current gates away and links up a fresh set. On error the old ring
    /// is left untouched.
    pub fn rebuild<I>(&mut self, specs: I) -> Result<(), RingError>
    where
        I: IntoIterator<Item = GateSpec>,
    {
        *self = Ring::build(specs)?;
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.gates.len()
    }

    pub fn index_mod(&self, i: isize) -> GateIndex {
        let count = self.gates.len() as isize;
        (((i % count) + count) % count) as GateIndex
    }

    pub fn gate(&self, i: GateIndex) -> &Gate {
        &self.gates[i % self.gates.len()]
    }

    pub fn prev(&self, i: GateIndex) -> &Gate {
        &self.gates[self.index_mod(i as isize - 1)]
    }

    pub fn next(&self, i: GateIndex) -> &Gate {
        &self.gates[self.index_mod(i as isize + 1)]
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn lap_flag(&self) -> &Gate {
        // build() guarantees exactly one
        self.gates
            .iter()
            .find(|gate| gate.is_lap_flag)
            .unwrap_or(&self.gates[0])
    }

    /// Forward direction of gate `i`. Auto-oriented gates take the bisector of their
    /// neighbours, worked out fresh every call so a rebuilt ring never sees stale values.
    pub fn forward(&self, i: GateIndex) -> DVec3 {
        let gate = self.gate(i);
        if !gate.auto_forward {
            return gate.authored_forward;
        }

        let from_prev = gate.anchor - self.prev(i).anchor;
        let from_next = gate.anchor - self.next(i).anchor;
        (from_prev - from_next).normalize_or_zero()
    }

    pub fn plane(&self, i: GateIndex) -> GatePlane {
        GatePlane {
            anchor: self.gate(i).anchor,
            normal: self.forward(i),
        }
    }

    pub fn has_passed(&self, i: GateIndex, position: DVec3) -> bool {
        self.plane(i).has_passed(position)
    }

    pub fn progress_along(&self, i: GateIndex, position: DVec3) -> f64 {
        self.plane(i).distance_to(position)
    }
}
