/// Direction of a port, as seen from inside the netlist that declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Input,
    Output,
    Inout,
}

impl Direction {
    pub fn is_input(self) -> bool {
        matches!(self, Direction::Input | Direction::Inout)
    }

    pub fn is_output(self) -> bool {
        matches!(self, Direction::Output | Direction::Inout)
    }
}

/// A typed terminal of a primitive or operator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Input,
    Input1,
    Input2,
    Input3,
    Output,
    Control,
    Clock,
    Cin,
    Cout,
    Set,
    Reset,
}

impl Role {
    pub const ALL: [Role; 11] = [
        Role::Input,
        Role::Input1,
        Role::Input2,
        Role::Input3,
        Role::Output,
        Role::Control,
        Role::Clock,
        Role::Cin,
        Role::Cout,
        Role::Set,
        Role::Reset,
    ];

    /// Name of the port that carries this terminal in primitive and operator views.
    pub fn name(self) -> &'static str {
        match self {
            Role::Input => "i",
            Role::Input1 => "i1",
            Role::Input2 => "i2",
            Role::Input3 => "i3",
            Role::Output => "o",
            Role::Control => "c",
            Role::Clock => "clk",
            Role::Cin => "cin",
            Role::Cout => "cout",
            Role::Set => "set",
            Role::Reset => "reset",
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.name() == name)
    }

    pub fn direction(self) -> Direction {
        match self {
            Role::Output | Role::Cout => Direction::Output,
            _ => Direction::Input,
        }
    }
}

macro_rules! primitive_kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// Every kind of primitive and operator the elaborator produces.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum PrimitiveKind {
            $($variant,)*
        }

        impl PrimitiveKind {
            pub const ALL: &'static [PrimitiveKind] = &[$(PrimitiveKind::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(PrimitiveKind::$variant => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<PrimitiveKind> {
                match name {
                    $($name => Some(PrimitiveKind::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

primitive_kinds! {
    Pwr => "pwr",
    Gnd => "gnd",
    X => "x",
    Z => "z",

    Buf => "buf",
    Inv => "inv",
    And => "and",
    Nand => "nand",
    Or => "or",
    Nor => "nor",
    Xor => "xor",
    Xnor => "xnor",
    Mux => "mux",
    Tri => "tri",
    Fadd => "fadd",
    Dffrs => "dffrs",
    Dlatchrs => "dlatchrs",

    Adder => "adder",
    Multiplier => "mult",
    Divider => "div",
    Modulo => "mod",
    Remainder => "rem",
    ShiftLeft => "shift_left",
    ShiftRight => "shift_right",
    EnabledDecoder => "enabled_decoder",
    Decoder => "decoder",
    ReduceAnd => "reduce_and",
    ReduceOr => "reduce_or",
    ReduceXor => "reduce_xor",
    ReduceXnor => "reduce_xnor",
    LessThan => "lessthan",
    WideAnd => "wide_and",
    WideOr => "wide_or",
    WideXor => "wide_xor",
    WideXnor => "wide_xnor",
    WideBuf => "wide_buf",
    WideInv => "wide_inv",
    Minus => "minus",
    UMinus => "uminus",
    Equal => "equal",
    NotEqual => "nequal",
    WideMux => "wide_mux",
    WideTri => "wide_tri",
    WideDffrs => "wide_dffrs",
    ReadPort => "read_port",
    WritePort => "write_port",
    ClockedWritePort => "clocked_write_port",
    PslPrev => "pslprev",
    Selector => "selector",

    SvaImmediateAssert => "sva_immediate_assert",
    SvaImmediateAssume => "sva_immediate_assume",
    SvaImmediateCover => "sva_immediate_cover",
    SvaAssert => "sva_assert",
    SvaAssume => "sva_assume",
    SvaCover => "sva_cover",
    SvaPosedge => "sva_posedge",
    SvaAt => "sva_at",
    SvaDisableIff => "sva_disable_iff",
    SvaOverlappedImplication => "sva_overlapped_implication",
    SvaNonOverlappedImplication => "sva_non_overlapped_implication",
    SvaSeqConcat => "sva_seq_concat",
    SvaConsecutiveRepeat => "sva_consecutive_repeat",
    SvaPast => "sva_past",
    SvaNot => "sva_not",
    SvaAnd => "sva_and",
    SvaOr => "sva_or",
    SvaThroughout => "sva_throughout",
    SvaWithin => "sva_within",
    SvaIntersect => "sva_intersect",
    SvaFirstMatch => "sva_first_match",
    SvaEventually => "sva_eventually",
    SvaUntil => "sva_until",
    SvaNonConsecutiveRepeat => "sva_non_consecutive_repeat",
    SvaGotoRepeat => "sva_goto_repeat",
    SvaRose => "sva_rose",
    SvaFell => "sva_fell",
    SvaStable => "sva_stable",

    PslAssert => "psl_assert",
    PslAssume => "psl_assume",
    PslCover => "psl_cover",
    PslAt => "psl_at",
    PslAbort => "psl_abort",
    PslAlways => "psl_always",
    PslImpl => "psl_impl",
    PslSuffixImpl => "psl_suffix_impl",
    PslNever => "psl_never",
    PslNext => "psl_next",
    PslEventually => "psl_eventually",
    PslUntil => "psl_until",

    HdlAssertion => "hdl_assertion",
    Pullup => "pullup",
    Pulldown => "pulldown",
    Nmos => "nmos",
    Pmos => "pmos",
}

impl PrimitiveKind {
    /// Word-level operators, whose terminals are buses of varying width.
    pub fn is_operator(self) -> bool {
        use PrimitiveKind::*;
        matches!(
            self,
            Adder
                | Multiplier
                | Divider
                | Modulo
                | Remainder
                | ShiftLeft
                | ShiftRight
                | EnabledDecoder
                | Decoder
                | ReduceAnd
                | ReduceOr
                | ReduceXor
                | ReduceXnor
                | LessThan
                | WideAnd
                | WideOr
                | WideXor
                | WideXnor
                | WideBuf
                | WideInv
                | Minus
                | UMinus
                | Equal
                | NotEqual
                | WideMux
                | WideTri
                | WideDffrs
                | ReadPort
                | WritePort
                | ClockedWritePort
                | PslPrev
                | Selector
        )
    }

    pub fn is_sva(self) -> bool {
        self.name().starts_with("sva_")
    }

    pub fn is_psl(self) -> bool {
        self.name().starts_with("psl_")
    }

    /// Operators of either assertion dialect, including past-value samplers.
    pub fn is_temporal(self) -> bool {
        self.is_sva() || self.is_psl() || self == PrimitiveKind::PslPrev
    }

    /// Terminals of the scalar view of a non-operator primitive.
    pub fn scalar_roles(self) -> &'static [Role] {
        use PrimitiveKind::*;
        match self {
            Pwr | Gnd | X | Z | Pullup | Pulldown => &[Role::Output],
            Buf | Inv | SvaPosedge | SvaConsecutiveRepeat | SvaNot | SvaFirstMatch | SvaEventually
            | SvaNonConsecutiveRepeat | SvaGotoRepeat | SvaRose | SvaFell | SvaStable | PslAlways | PslNever
            | PslNext | PslEventually => &[Role::Input, Role::Output],
            And | Nand | Or | Nor | Xor | Xnor | SvaAt | SvaDisableIff | SvaOverlappedImplication
            | SvaNonOverlappedImplication | SvaSeqConcat | SvaPast | SvaAnd | SvaOr | SvaThroughout | SvaWithin
            | SvaIntersect | SvaUntil | PslAt | PslAbort | PslImpl | PslSuffixImpl | PslUntil => {
                &[Role::Input1, Role::Input2, Role::Output]
            }
            Mux => &[Role::Input1, Role::Input2, Role::Control, Role::Output],
            Tri | Nmos | Pmos => &[Role::Input, Role::Control, Role::Output],
            Fadd => &[Role::Input1, Role::Input2, Role::Cin, Role::Output, Role::Cout],
            Dffrs => &[Role::Set, Role::Reset, Role::Clock, Role::Input, Role::Output],
            Dlatchrs => &[Role::Set, Role::Reset, Role::Control, Role::Input, Role::Output],
            SvaImmediateAssert | SvaImmediateAssume | SvaImmediateCover | SvaAssert | SvaAssume | SvaCover
            | PslAssert | PslAssume | PslCover | HdlAssertion => &[Role::Input],
            _ => &[],
        }
    }
}
