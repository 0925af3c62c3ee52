use std::collections::BTreeMap;

use jzon::JsonValue;

use crate::{Database, Direction, LineFile, NetId, NetlistId, PrimitiveKind, RamInfo, Role};

#[derive(Debug)]
pub struct SyntaxError(JsonValue);

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "syntax error near: {}", self.0)
    }
}

impl std::error::Error for SyntaxError {}

#[derive(Debug)]
pub enum LoadError {
    Json(jzon::Error),
    Syntax(SyntaxError),
    UnknownNetlist(String),
    UnknownNet { netlist: String, net: String },
    UnknownPort { netlist: String, port: String },
    UnknownPrimitive(String),
}

impl From<jzon::Error> for LoadError {
    fn from(error: jzon::Error) -> Self {
        LoadError::Json(error)
    }
}

impl From<SyntaxError> for LoadError {
    fn from(error: SyntaxError) -> Self {
        LoadError::Syntax(error)
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LoadError::Json(error) => write!(f, "{error}"),
            LoadError::Syntax(error) => write!(f, "{error}"),
            LoadError::UnknownNetlist(name) => write!(f, "netlist {name:?} is not defined"),
            LoadError::UnknownNet { netlist, net } => write!(f, "net {net:?} is not defined in netlist {netlist:?}"),
            LoadError::UnknownPort { netlist, port } => {
                write!(f, "port {port:?} is not defined in netlist {netlist:?}")
            }
            LoadError::UnknownPrimitive(kind) => write!(f, "primitive kind {kind:?} is not known"),
        }
    }
}

impl std::error::Error for LoadError {}

fn syntax_error(value: &JsonValue) -> SyntaxError {
    SyntaxError(value.clone())
}

fn get_str<'a>(value: &'a JsonValue, key: &str) -> Result<&'a str, SyntaxError> {
    value[key].as_str().ok_or_else(|| syntax_error(value))
}

fn get_bool(value: &JsonValue, key: &str, default: bool) -> Result<bool, SyntaxError> {
    match &value[key] {
        JsonValue::Null => Ok(default),
        field => field.as_bool().ok_or_else(|| syntax_error(value)),
    }
}

fn get_range(value: &JsonValue) -> Result<Option<(i64, i64)>, SyntaxError> {
    match (&value["left"], &value["right"]) {
        (JsonValue::Null, JsonValue::Null) => Ok(None),
        (left, right) => match (left.as_i64(), right.as_i64()) {
            (Some(left), Some(right)) => Ok(Some((left, right))),
            _ => Err(syntax_error(value)),
        },
    }
}

fn get_attributes(value: &JsonValue) -> Result<BTreeMap<String, String>, SyntaxError> {
    let mut attributes = BTreeMap::new();
    match &value["attributes"] {
        JsonValue::Null => (),
        JsonValue::Object(object) => {
            for (name, attr_value) in object.iter() {
                let attr_value = attr_value.as_str().ok_or_else(|| syntax_error(attr_value))?;
                attributes.insert(name.to_owned(), attr_value.to_owned());
            }
        }
        _ => return Err(syntax_error(value)),
    }
    Ok(attributes)
}

fn get_linefile(value: &JsonValue) -> Result<Option<LineFile>, SyntaxError> {
    match &value["src"] {
        JsonValue::Null => Ok(None),
        src => {
            let src = src.as_str().ok_or_else(|| syntax_error(value))?;
            let (file, line) = src.rsplit_once(':').ok_or_else(|| syntax_error(value))?;
            let line = line.parse().map_err(|_| syntax_error(value))?;
            Ok(Some(LineFile { file: file.to_owned(), line }))
        }
    }
}

fn get_direction(value: &JsonValue) -> Result<Direction, SyntaxError> {
    match value["direction"].as_str() {
        Some("input") => Ok(Direction::Input),
        Some("output") => Ok(Direction::Output),
        Some("inout") => Ok(Direction::Inout),
        _ => Err(syntax_error(value)),
    }
}

fn members(value: &JsonValue, key: &str) -> Result<Vec<JsonValue>, SyntaxError> {
    match &value[key] {
        JsonValue::Null => Ok(vec![]),
        JsonValue::Array(items) => Ok(items.clone()),
        _ => Err(syntax_error(value)),
    }
}

struct Loader {
    db: Database,
    netlists: BTreeMap<String, NetlistId>,
}

impl Loader {
    fn lookup_net(&self, netlist: NetlistId, value: &JsonValue) -> Result<Option<NetId>, LoadError> {
        match value {
            JsonValue::Null => Ok(None),
            _ => {
                let name = value.as_str().ok_or_else(|| syntax_error(value))?;
                match self.db.find_net(netlist, name) {
                    Some(net) => Ok(Some(net)),
                    None => Err(LoadError::UnknownNet {
                        netlist: self.db.netlist(netlist).name.clone(),
                        net: name.to_owned(),
                    }),
                }
            }
        }
    }

    /// A single net name, or an array of net names (or `null`) least significant bit first.
    fn lookup_nets(&self, netlist: NetlistId, value: &JsonValue) -> Result<Vec<Option<NetId>>, LoadError> {
        match value {
            JsonValue::Array(items) => items.iter().map(|item| self.lookup_net(netlist, item)).collect(),
            _ => Ok(vec![self.lookup_net(netlist, value)?]),
        }
    }

    fn handle_ports(&mut self, netlist: NetlistId, body: &JsonValue) -> Result<(), LoadError> {
        for port in members(body, "ports")? {
            let name = get_str(&port, "name")?;
            let direction = get_direction(&port)?;
            match get_range(&port)? {
                Some((left, right)) => {
                    self.db.add_port_bus(netlist, name, direction, left, right);
                }
                None => {
                    self.db.add_port(netlist, name, direction);
                }
            }
        }
        Ok(())
    }

    fn handle_net_metadata(&mut self, net: NetId, value: &JsonValue) -> Result<(), LoadError> {
        self.db.set_net_user_declared(net, get_bool(value, "user_declared", true)?);
        for (name, attr_value) in get_attributes(value)? {
            self.db.set_net_attribute(net, name, attr_value);
        }
        if get_bool(value, "anyseq", false)? {
            self.db.set_net_attribute(net, " rand", "1");
        }
        if get_bool(value, "anyconst", false)? {
            self.db.set_net_attribute(net, " rand_const", "1");
        }
        if let Some(linefile) = get_linefile(value)? {
            self.db.set_net_linefile(net, linefile);
        }
        Ok(())
    }

    fn handle_nets(&mut self, netlist: NetlistId, body: &JsonValue) -> Result<(), LoadError> {
        for net_value in members(body, "nets")? {
            let name = get_str(&net_value, "name")?;
            match get_range(&net_value)? {
                Some((left, right)) => {
                    let bus = self.db.add_net_bus(netlist, name, left, right);
                    self.db.set_net_bus_user_declared(bus, get_bool(&net_value, "user_declared", true)?);
                    for (name, attr_value) in get_attributes(&net_value)? {
                        self.db.set_net_bus_attribute(bus, name, attr_value);
                    }
                    if let Some(linefile) = get_linefile(&net_value)? {
                        self.db.set_net_bus_linefile(bus, linefile);
                    }
                    let nets = self.db.net_bus(bus).nets.clone();
                    let init: Vec<char> = match &net_value["init"] {
                        JsonValue::Null => vec![],
                        init => init.as_str().ok_or_else(|| syntax_error(&net_value))?.chars().collect(),
                    };
                    if !init.is_empty() && init.len() != nets.len() {
                        return Err(syntax_error(&net_value).into());
                    }
                    for (position, net) in nets.into_iter().flatten().enumerate() {
                        self.handle_net_metadata(net, &net_value)?;
                        if let Some(&value) = init.get(position) {
                            self.db.set_net_initial_value(net, value);
                        }
                    }
                }
                None => {
                    let net = self.db.add_net(netlist, name);
                    self.handle_net_metadata(net, &net_value)?;
                    match &net_value["init"] {
                        JsonValue::Null => (),
                        init => {
                            let mut chars = init.as_str().ok_or_else(|| syntax_error(&net_value))?.chars();
                            match (chars.next(), chars.next()) {
                                (Some(value), None) => self.db.set_net_initial_value(net, value),
                                _ => return Err(syntax_error(&net_value).into()),
                            }
                        }
                    }
                    let ram = &net_value["ram"];
                    if !ram.is_null() {
                        let size = ram["size"].as_usize().ok_or_else(|| syntax_error(ram))?;
                        let init = ram["init"].as_str().map(str::to_owned);
                        let ascending = get_bool(ram, "ascending", false)?;
                        self.db.set_net_ram(net, RamInfo { size, init, ascending });
                    }
                }
            }
        }
        // ports are carried by the net of the same name
        for port in self.db.netlist(netlist).ports.clone() {
            if let Some(net) = self.db.find_net(netlist, &self.db.port(port).name) {
                self.db.connect_port_net(port, net);
            }
        }
        Ok(())
    }

    fn handle_instances(&mut self, netlist: NetlistId, body: &JsonValue) -> Result<(), LoadError> {
        for inst_value in members(body, "instances")? {
            let name = get_str(&inst_value, "name")?;
            let instance = if let Some(kind_name) = inst_value["kind"].as_str() {
                let kind =
                    PrimitiveKind::from_name(kind_name).ok_or_else(|| LoadError::UnknownPrimitive(kind_name.into()))?;
                let mut pins = vec![];
                if let JsonValue::Object(object) = &inst_value["pins"] {
                    for (role_name, nets) in object.iter() {
                        let role = Role::from_name(role_name).ok_or_else(|| LoadError::UnknownPort {
                            netlist: kind_name.to_owned(),
                            port: role_name.to_owned(),
                        })?;
                        pins.push((role, self.lookup_nets(netlist, nets)?));
                    }
                } else if !inst_value["pins"].is_null() {
                    return Err(syntax_error(&inst_value).into());
                }
                let instance = if kind.is_operator() {
                    let widths: Vec<_> = pins.iter().map(|(role, nets)| (*role, nets.len())).collect();
                    let signed = get_bool(&inst_value, "signed", false)?;
                    self.db.add_operator(netlist, name, kind, signed, &widths)
                } else {
                    self.db.add_primitive(netlist, name, kind)
                };
                for (role, nets) in pins {
                    if self.db.pin_width(instance, role) != nets.len() {
                        return Err(LoadError::UnknownPort { netlist: kind_name.to_owned(), port: role.name().into() });
                    }
                    self.db.connect_pin_bits(instance, role, &nets);
                }
                self.db.set_instance_user_declared(instance, get_bool(&inst_value, "user_declared", false)?);
                instance
            } else {
                let module_name = get_str(&inst_value, "module")?;
                let module = *self
                    .netlists
                    .get(module_name)
                    .ok_or_else(|| LoadError::UnknownNetlist(module_name.to_owned()))?;
                let instance = self.db.add_instance(netlist, name, module);
                if let JsonValue::Object(object) = &inst_value["connections"] {
                    for (port_name, nets) in object.iter() {
                        let nets = self.lookup_nets(netlist, nets)?;
                        let unknown_port = || LoadError::UnknownPort {
                            netlist: module_name.to_owned(),
                            port: port_name.to_owned(),
                        };
                        let ports = match self.db.find_port_bus(module, port_name) {
                            Some(bus) => self.db.port_bus(bus).ports.iter().rev().copied().collect(),
                            None => vec![self.db.find_port(module, port_name).ok_or_else(unknown_port)?],
                        };
                        if ports.len() != nets.len() {
                            return Err(unknown_port());
                        }
                        for (port, net) in ports.into_iter().zip(nets) {
                            if let Some(net) = net {
                                self.db.connect(instance, port, net);
                            }
                        }
                    }
                } else if !inst_value["connections"].is_null() {
                    return Err(syntax_error(&inst_value).into());
                }
                self.db.set_instance_user_declared(instance, get_bool(&inst_value, "user_declared", true)?);
                instance
            };
            for (name, attr_value) in get_attributes(&inst_value)? {
                self.db.set_instance_attribute(instance, name, attr_value);
            }
            if let Some(linefile) = get_linefile(&inst_value)? {
                self.db.set_instance_linefile(instance, linefile);
            }
        }
        Ok(())
    }
}

/// Loads an elaborated design from its JSON interchange form.
///
/// Returns the design and its top-level netlists: those listed under `"top"`, or, if there is
/// no such list, every netlist that is not instantiated anywhere.
pub fn load_json(text: &str) -> Result<(Database, Vec<NetlistId>), LoadError> {
    let root = jzon::parse(text)?;
    let JsonValue::Object(netlist_values) = &root["netlists"] else {
        return Err(syntax_error(&root).into());
    };
    let mut loader = Loader { db: Database::new(), netlists: BTreeMap::new() };
    let mut bodies = vec![];
    for (name, body) in netlist_values.iter() {
        let netlist = loader.db.add_module(name);
        loader.db.set_blackbox(netlist, get_bool(body, "blackbox", false)?);
        for (attr_name, attr_value) in get_attributes(body)? {
            loader.db.set_netlist_attribute(netlist, attr_name, attr_value);
        }
        if let Some(linefile) = get_linefile(body)? {
            loader.db.set_netlist_linefile(netlist, linefile);
        }
        loader.netlists.insert(name.to_owned(), netlist);
        bodies.push((netlist, body));
    }
    for &(netlist, body) in &bodies {
        loader.handle_ports(netlist, body)?;
        loader.handle_nets(netlist, body)?;
    }
    for &(netlist, body) in &bodies {
        loader.handle_instances(netlist, body)?;
    }
    let tops = match &root["top"] {
        JsonValue::Null => bodies
            .iter()
            .map(|&(netlist, _)| netlist)
            .filter(|&netlist| loader.db.netlist(netlist).references.is_empty())
            .collect(),
        JsonValue::Array(names) => {
            let mut tops = vec![];
            for name in names {
                let name = name.as_str().ok_or_else(|| syntax_error(name))?;
                tops.push(*loader.netlists.get(name).ok_or_else(|| LoadError::UnknownNetlist(name.to_owned()))?);
            }
            tops
        }
        _ => return Err(syntax_error(&root).into()),
    };
    Ok((loader.db, tops))
}
