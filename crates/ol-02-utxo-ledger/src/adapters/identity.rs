use crate::domain::PublicKey;
use crate::ports::IdentityProvider;

/// Identity backed by a fixed public key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticIdentity {
    public_key: PublicKey,
}

impl StaticIdentity {
    pub fn new(public_key: impl Into<PublicKey>) -> Self {
        Self {
            public_key: public_key.into(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn public_key(&self) -> PublicKey {
        self.public_key.clone()
    }
}
