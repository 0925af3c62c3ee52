#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Unsupported { netlist: String, instance: String, reason: String },
    UnsupportedRange { netlist: String, instance: String, low: String, high: String },
    AsymmetricMemory { netlist: String, memory: String, instance: String },
    UnsupportedRamConnection { netlist: String, memory: String, instance: String },
    ExternalReference { netlist: String, net: String, owner: String },
    DuplicateModule(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Unsupported { netlist, instance, reason } => {
                write!(f, "cannot import instance {instance:?} in netlist {netlist:?}: {reason}")
            }
            Error::UnsupportedRange { netlist, instance, low, high } => write!(
                f,
                "cannot import instance {instance:?} in netlist {netlist:?}: delay range {low}:{high} is not supported"
            ),
            Error::AsymmetricMemory { netlist, memory, instance } => write!(
                f,
                "import of asymmetric memories is not supported: port {instance:?} of memory {memory:?} \
                 in netlist {netlist:?}"
            ),
            Error::UnsupportedRamConnection { netlist, memory, instance } => write!(
                f,
                "memory net {memory:?} in netlist {netlist:?} is connected to unsupported instance {instance:?}"
            ),
            Error::ExternalReference { netlist, net, owner } => write!(
                f,
                "found external reference to {owner}.{net} in netlist {netlist:?}, \
                 flatten the design or resolve external nets first"
            ),
            Error::DuplicateModule(name) => write!(f, "re-definition of module {name:?}"),
        }
    }
}

impl std::error::Error for Error {}

/// A recoverable problem, reported once the import completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub netlist: String,
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: {}", self.netlist, self.message)
    }
}
