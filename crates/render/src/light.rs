//! Point-light uniform upload.
//!
//! Shaders declare
//!
//! ```glsl
//! struct PointLight { vec3 position; vec3 diffuse; vec3 specular;
//!                     float constant; float linear; float quadratic; };
//! uniform PointLight pointLights[MAX_POINT_LIGHTS];
//! uniform int pointLightCount;
//! ```

use crate::{GlDevice, ShaderProgram, uniform::indexed_field};
use marchlight_common::PointLight;

pub const POINT_LIGHTS_UNIFORM: &str = "pointLights";
pub const POINT_LIGHT_COUNT_UNIFORM: &str = "pointLightCount";
/// Array length the bundled shaders are compiled with.
pub const MAX_POINT_LIGHTS: usize = 4;

/// Write `lights` into the `pointLights` array of the active program.
///
/// Lights past [`MAX_POINT_LIGHTS`] are dropped. Returns how many were written.
pub fn upload_point_lights<D: GlDevice + ?Sized>(
    shader: &ShaderProgram<D>,
    lights: &[PointLight],
) -> usize {
    if lights.len() > MAX_POINT_LIGHTS {
        tracing::warn!(
            "{} point lights given, only {MAX_POINT_LIGHTS} are uploaded",
            lights.len()
        );
    }
    let count = lights.len().min(MAX_POINT_LIGHTS);
    for (i, light) in lights.iter().take(count).enumerate() {
        let field = |name: &str| indexed_field(POINT_LIGHTS_UNIFORM, i, name);
        shader.set_uniform(&field("position"), light.position);
        shader.set_uniform(&field("diffuse"), light.diffuse);
        shader.set_uniform(&field("specular"), light.specular);
        shader.set_uniform(&field("constant"), light.constant);
        shader.set_uniform(&field("linear"), light.linear);
        shader.set_uniform(&field("quadratic"), light.quadratic);
    }
    shader.set_uniform(POINT_LIGHT_COUNT_UNIFORM, count as i32);
    count
}
