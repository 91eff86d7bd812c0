//! Canonical rig parameter ids.
//!
//! Modern rigs expose camel-case ids (`ParamAngleX`); older exports use the
//! upper-snake spelling (`PARAM_ANGLE_X`). The compositor emits every write
//! under both so either vintage of rig picks it up; the render backend drops
//! ids its rig does not have.

pub const ANGLE_X: &str = "ParamAngleX";
pub const ANGLE_Y: &str = "ParamAngleY";
pub const ANGLE_Z: &str = "ParamAngleZ";
pub const EYE_L_OPEN: &str = "ParamEyeLOpen";
pub const EYE_R_OPEN: &str = "ParamEyeROpen";
pub const EYE_BALL_X: &str = "ParamEyeBallX";
pub const EYE_BALL_Y: &str = "ParamEyeBallY";
pub const BROW_L_Y: &str = "ParamBrowLY";
pub const BROW_R_Y: &str = "ParamBrowRY";
pub const MOUTH_FORM: &str = "ParamMouthForm";
pub const MOUTH_OPEN_Y: &str = "ParamMouthOpenY";
pub const BODY_ANGLE_X: &str = "ParamBodyAngleX";
pub const BREATH: &str = "ParamBreath";

/// Upper-snake spelling of a camel-case parameter id.
///
/// An underscore is inserted before every uppercase letter except the first,
/// then the whole id is uppercased: `ParamAngleX` becomes `PARAM_ANGLE_X`.
/// Only meaningful for canonical camel-case ids.
pub fn legacy_alias(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 4);
    for (i, ch) in id.chars().enumerate() {
        if ch.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(ch.to_ascii_uppercase());
    }
    out
}
