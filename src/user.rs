/// The Steam account whose library is being ranked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub steam_id: String,
    pub display_name: String,
}

impl User {
    pub fn new(steam_id: &str, display_name: &str) -> Self {
        Self {
            steam_id: steam_id.trim().to_string(),
            display_name: display_name.to_string(),
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.steam_id)
    }
}

/// SteamID64s are always 17 decimal digits; anything else is a vanity name.
pub fn is_steam_id64(user: &str) -> bool {
    let user = user.trim();
    user.len() == 17 && user.bytes().all(|b| b.is_ascii_digit())
}
