pub mod control_strip;
pub mod phrase_picker;
