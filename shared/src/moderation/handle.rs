use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct AddBannedWordDescriptor {
    pub word: String,
}

#[derive(Serialize, Deserialize)]
pub struct RemoveBannedWordDescriptor {
    pub word: String,
}
