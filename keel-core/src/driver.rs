use crate::Connection;

pub trait Driver: Send + Sync {
    type Connection: Connection;

    /// Scheme of the connection urls this driver accepts.
    const NAME: &'static str;
}
