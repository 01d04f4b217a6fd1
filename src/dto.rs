use serde::{Deserialize, Serialize};

/// Data transfer object for signing up or signing in
///
/// This struct is the JSON body of `POST /accounts` and `POST /sessions`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CredentialsDto {
    pub email: String,
    pub password: String,
}
