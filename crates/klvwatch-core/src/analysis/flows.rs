use std::fmt;
use std::net::SocketAddr;

use serde::{Serialize, Serializer};

/// Direction-sensitive UDP flow: datagrams from `src` to `dst`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FlowKey {
    pub src: SocketAddr,
    pub dst: SocketAddr,
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)
    }
}

impl Serialize for FlowKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::FlowKey;

    #[test]
    fn display_brackets_ipv6() {
        let v4 = FlowKey {
            src: "10.0.0.1:5000".parse().unwrap(),
            dst: "239.1.1.1:15000".parse().unwrap(),
        };
        assert_eq!(v4.to_string(), "10.0.0.1:5000 -> 239.1.1.1:15000");

        let v6 = FlowKey {
            src: "[::1]:5000".parse().unwrap(),
            dst: "[ff02::1]:15000".parse().unwrap(),
        };
        assert_eq!(v6.to_string(), "[::1]:5000 -> [ff02::1]:15000");
    }

    #[test]
    fn serializes_as_string() {
        let key = FlowKey {
            src: "10.0.0.1:5000".parse().unwrap(),
            dst: "10.0.0.2:6000".parse().unwrap(),
        };
        assert_eq!(
            serde_json::to_string(&key).unwrap(),
            "\"10.0.0.1:5000 -> 10.0.0.2:6000\""
        );
    }

    #[test]
    fn ordering_is_by_source_then_destination() {
        let a = FlowKey {
            src: "10.0.0.1:5000".parse().unwrap(),
            dst: "10.0.0.9:1".parse().unwrap(),
        };
        let b = FlowKey {
            src: "10.0.0.2:5000".parse().unwrap(),
            dst: "10.0.0.0:1".parse().unwrap(),
        };
        assert!(a < b);
    }
}
