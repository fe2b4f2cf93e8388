// src/utils/constants.rs

/// File name of the serialized regression model, resolved inside the artifact directory.
pub const MODEL_FILE_NAME: &str = "pH_model.json";

/// File name of the serialized input scaler, resolved inside the artifact directory.
pub const SCALER_FILE_NAME: &str = "pH_scaler.json";

/// Request keys in the exact column order the scaler and model were fitted with.
pub const FEATURE_KEYS: [&str; 6] = ["r_ref", "g_ref", "b_ref", "r_sample", "g_sample", "b_sample"];

pub const FEATURE_COUNT: usize = FEATURE_KEYS.len();

/// Decimal places kept in the `prediksi_ph` response field.
pub const PREDICTION_DECIMALS: i32 = 2;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

pub const HOME_MESSAGE: &str =
    "Selamat! Server JST (ANN) Anda sudah online. Gunakan endpoint /prediksi untuk menebak pH.";
pub const NOT_READY_MESSAGE: &str = "Model tidak siap. Cek log server.";
pub const INCOMPLETE_DATA_MESSAGE: &str = "Data JSON tidak lengkap. Butuh 6 kunci RGB.";
