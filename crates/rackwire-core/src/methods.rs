//! Static method and topic tables.
//!
//! The engine answers a closed set of read/query methods with correlated
//! responses; every other method is fire-and-forget. The table is sorted
//! so membership is a binary search.

/// Methods the engine answers with a correlated `{id, result}` response.
const REPLY_REQUIRED: &[&str] = &[
    "bank_check_reparse",
    "bank_get_contents",
    "bank_get_filename",
    "bank_insert_content",
    "bank_insert_new",
    "bank_remove",
    "banks",
    "convert_preset",
    "desc",
    "get",
    "get_bank",
    "get_last_midi_control_value",
    "get_midi_controller_map",
    "get_midi_feedback",
    "get_oscilloscope_mul_buffer",
    "get_parameter",
    "get_parameter_value",
    "get_rack_unit_order",
    "get_tuner_freq",
    "get_tuner_note",
    "get_tuner_switcher_active",
    "get_tuning",
    "getstate",
    "getversion",
    "jack_cpu_load",
    "ladspaloader_update_plugins",
    "list",
    "load_impresp_dirs",
    "load_ladspalist",
    "midi_get_config_mode",
    "midi_size",
    "parameterlist",
    "plugin_load_ui",
    "plugin_preset_list_load",
    "pluginlist",
    "presets",
    "queryunit",
    "read_audio",
    "rename_bank",
    "rename_preset",
];

/// Subscription call transmitted on every open.
pub const LISTEN_METHOD: &str = "listen";

/// Notification topics announced in the [`LISTEN_METHOD`] call.
pub const SUBSCRIBE_TOPICS: &[&str] = &[
    "state",
    "freq",
    "display",
    "tuner",
    "presetlist_changed",
    "param",
    "units_changed",
    "preset",
];

/// Namespace prefix for notification event names.
pub const NOTIFY_NAMESPACE: &str = "engine";

/// Whether `method` expects a correlated response from the engine.
pub fn requires_reply(method: &str) -> bool {
    REPLY_REQUIRED.binary_search(&method).is_ok()
}

/// Event name a notification with this `method` is broadcast under.
pub fn notification_topic(method: &str) -> String {
    format!("{NOTIFY_NAMESPACE}::{method}")
}
