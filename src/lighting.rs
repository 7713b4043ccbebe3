use glam::Vec3;

use crate::uniforms::{self, UniformError, UniformSink};

/// Switchable light sources in the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lamp {
    Ceiling,
    Night,
}

impl Lamp {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ceiling" => Some(Self::Ceiling),
            "night" => Some(Self::Night),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ceiling => "ceiling",
            Self::Night => "night",
        }
    }
}

/// Lamp switches plus the static light placement of the room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ceiling_lamp_on: bool,
    pub night_lamp_on: bool,
    pub ceiling_lamp_position: Vec3,
    pub night_lamp_position: Vec3,
    pub directional_light: Vec3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ceiling_lamp_on: true,
            night_lamp_on: true,
            ceiling_lamp_position: Vec3::new(4.0, 5.0, 5.0),
            night_lamp_position: Vec3::new(-0.3, 1.15, 0.5),
            directional_light: Vec3::new(-0.2, -1.0, -0.3),
        }
    }
}

impl Lighting {
    pub fn is_on(&self, lamp: Lamp) -> bool {
        match lamp {
            Lamp::Ceiling => self.ceiling_lamp_on,
            Lamp::Night => self.night_lamp_on,
        }
    }

    /// Flips a lamp and returns its new state.
    pub fn toggle(&mut self, lamp: Lamp) -> bool {
        let switch = match lamp {
            Lamp::Ceiling => &mut self.ceiling_lamp_on,
            Lamp::Night => &mut self.night_lamp_on,
        };
        *switch = !*switch;
        *switch
    }

    /// Writes the light placement, which never changes after startup.
    pub fn apply_static<S: UniformSink + ?Sized>(&self, sink: &mut S) -> Result<(), UniformError> {
        sink.set_vec3(uniforms::CEILING_LAMP_POSITION, self.ceiling_lamp_position)?;
        sink.set_vec3(uniforms::NIGHT_LAMP_POSITION, self.night_lamp_position)?;
        sink.set_vec3(uniforms::DIRECTIONAL_LIGHT, self.directional_light)
    }

    pub fn apply_switches<S: UniformSink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> Result<(), UniformError> {
        sink.set_bool(uniforms::CEILING_LAMP_STATUS, self.ceiling_lamp_on)?;
        sink.set_bool(uniforms::NIGHT_LAMP_STATUS, self.night_lamp_on)
    }
}
