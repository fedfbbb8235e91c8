//! Conversion of Content MathML elements into operator trees.
use mathml_reader::Element;

use crate::error::{ConvertErrKind, ConvertError};
use crate::normalize::Normalizer;
use crate::operators::{CONSTANTS, OPERATORS, is_qualifier};
use crate::tag::{ERROR, FRACTION, MATRIX, NUMBER, RADICAL, VARIABLE, WHITESPACE, clean, is_non_operator};
use crate::tree::{Edge, NodeId};

/// Heads that bind a variable over a body.
const BIG_OPERATORS: [&str; 4] = ["∫", "∑", "∏", "lim"];

/// The qualifiers of one `apply`, by the edge they end up on.
#[derive(Default, Clone)]
struct Qualifiers<'e> {
    variables: Vec<&'e Element>,
    lower: Option<&'e Element>,
    upper: Option<&'e Element>,
    degree: Option<&'e Element>,
}

impl<'e> Qualifiers<'e> {
    /// Separates the qualifiers among `children` from the operands.
    fn split(children: &'e [Element]) -> (Self, Vec<&'e Element>) {
        let mut qualifiers = Qualifiers::default();
        let mut operands = Vec::new();
        for child in children {
            if is_qualifier(child.name()) {
                qualifiers.add(child);
            } else {
                operands.push(child);
            }
        }
        (qualifiers, operands)
    }

    fn add(&mut self, elem: &'e Element) {
        match elem.name() {
            "bvar" => self.variables.push(elem),
            "uplimit" => self.upper = Some(elem),
            "degree" => self.degree = Some(elem),
            _ => {
                self.lower.get_or_insert(elem);
            }
        }
    }
}

impl Normalizer<'_> {
    pub(crate) fn content(&mut self, elem: &Element) -> Result<Option<NodeId>, ConvertError> {
        let name = elem.name();
        if let Some(&tag) = CONSTANTS.get(name) {
            return Ok(self.leaf(tag));
        }
        if let Some(&tag) = OPERATORS.get(name) {
            return Ok(self.leaf(tag));
        }
        let node = match name {
            "apply" | "bind" => self.apply(elem)?,
            "lambda" => {
                let (qualifiers, operands) = Qualifiers::split(elem.children());
                let head = self.tree.push("λ");
                Some(self.generic(head, &operands, &qualifiers)?)
            }
            "ci" => match elem.children().first() {
                Some(child) => self.normalize(child)?,
                None => self.marked(VARIABLE, elem.text()),
            },
            "cn" => self.marked(NUMBER, elem.text()),
            "csymbol" => {
                let text = clean(elem.text());
                if text.is_empty() || text == "absent" {
                    self.leaf(WHITESPACE)
                } else {
                    self.leaf(text)
                }
            }
            "cerror" => {
                let text = match elem.children().first() {
                    Some(symbol) => symbol.text(),
                    None => elem.text(),
                };
                self.leaf(ERROR.to_string() + &clean(text))
            }
            "share" => self.leaf(WHITESPACE),
            "matrix" => {
                let rows = self.normalized(elem)?;
                Some(self.make_matrix(rows))
            }
            "matrixrow" | "piece" | "otherwise" => {
                let cells = self.cells(elem.children())?;
                match self.chain_cells(&cells) {
                    Some(first) => Some(first),
                    None => self.leaf(WHITESPACE),
                }
            }
            "piecewise" => {
                let rows = self.normalized(elem)?;
                Some(self.cases(rows))
            }
            "vector" => {
                let cells = self.cells(elem.children())?;
                let tag = format!("{MATRIX}(){}x1", cells.len());
                Some(self.fenced_cells(tag, &cells))
            }
            "list" | "set" => {
                let fences = if name == "set" { "{}" } else { "()" };
                let cells = self.cells(elem.children())?;
                let tag = format!("{MATRIX}{fences}1x{}", cells.len());
                Some(self.fenced_cells(tag, &cells))
            }
            "interval" => {
                let fences = match elem.attribute("closure").unwrap_or("closed") {
                    "open" => "()",
                    "open-closed" => "(&rsqb;",
                    "closed-open" => "&lsqb;)",
                    _ => "&lsqb;&rsqb;",
                };
                let cells = self.cells(elem.children())?;
                let tag = format!("{MATRIX}{fences}1x{}", cells.len());
                Some(self.fenced_cells(tag, &cells))
            }
            name if is_qualifier(name) => {
                let kept = self.kept(elem)?;
                self.splice(&kept)
            }
            _ => {
                return Err(ConvertError(
                    elem.span(),
                    ConvertErrKind::UnknownTag(name.into()),
                ));
            }
        };
        Ok(node)
    }

    /// Converts elements into cells, with whitespace standing in for empty ones.
    fn cells(&mut self, elems: &[Element]) -> Result<Vec<NodeId>, ConvertError> {
        let mut cells = Vec::with_capacity(elems.len());
        for elem in elems {
            let cell = self.normalize(elem)?;
            cells.push(self.base(cell));
        }
        Ok(cells)
    }

    fn fenced_cells(&mut self, tag: String, cells: &[NodeId]) -> NodeId {
        let matrix = self.tree.push(tag);
        let first = self.chain_cells(cells);
        self.tree.set_child(matrix, Edge::Within, first);
        matrix
    }

    /// A matrix of value/condition rows, tagged `M!{RxC`.
    fn cases(&mut self, rows: Vec<Option<NodeId>>) -> NodeId {
        let matrix = self.make_matrix(rows);
        let tag = format!("{MATRIX}{{{}", &self.tree.tag(matrix)[MATRIX.len()..]);
        self.tree.set_tag(matrix, tag);
        matrix
    }

    fn apply(&mut self, elem: &Element) -> Result<Option<NodeId>, ConvertError> {
        let Some((head, rest)) = elem.children().split_first() else {
            return Ok(None);
        };
        let (qualifiers, operands) = Qualifiers::split(rest);

        let node = match head.name() {
            "csymbol" => match head.text().trim() {
                "subscript" => self.scripted(&operands, Edge::Below)?,
                "superscript" => self.scripted(&operands, Edge::Above)?,
                "cases" => {
                    let mut rows = Vec::new();
                    for pair in operands.chunks(2) {
                        let cells = self.cells_of(pair)?;
                        rows.push(self.chain_cells(&cells));
                    }
                    Some(self.cases(rows))
                }
                _ => {
                    let head = self.operator_head(head)?;
                    Some(self.generic(head, &operands, &qualifiers)?)
                }
            },
            "int" | "sum" | "product" | "limit" => {
                let root = self.operator_head(head)?;
                Some(self.big_operator(root, head.name() == "int", &operands, &qualifiers)?)
            }
            "root" => {
                let root = self.tree.push(RADICAL);
                let degree = self.optional(qualifiers.degree)?;
                let body = self.operand_row(&operands)?;
                self.tree.set_child(root, Edge::PreAbove, degree);
                self.tree.set_child(root, Edge::Within, body);
                Some(root)
            }
            "divide" if operands.len() == 2 => {
                let root = self.tree.push(FRACTION);
                let numerator = self.normalize(operands[0])?;
                let denominator = self.normalize(operands[1])?;
                self.tree.set_child(root, Edge::Over, numerator);
                self.tree.set_child(root, Edge::Under, denominator);
                Some(root)
            }
            "power" if operands.len() == 2 => self.scripted(&operands, Edge::Above)?,
            "abs" | "floor" | "ceiling" => {
                let fences = match head.name() {
                    "abs" => "||",
                    "floor" => "⌊⌋",
                    _ => "⌈⌉",
                };
                let cells = self.cells_of(&operands)?;
                let tag = format!("{MATRIX}{fences}1x{}", cells.len());
                Some(self.fenced_cells(tag, &cells))
            }
            "ci" => {
                let function = self.operator_head(head)?;
                Some(self.application(function, &operands)?)
            }
            "apply" => {
                let function = self.operator_head(head)?;
                let tag = self.tree.tag(function);
                if BIG_OPERATORS.contains(&tag) {
                    let integral = tag == "∫";
                    Some(self.big_operator(function, integral, &operands, &qualifiers)?)
                } else if is_non_operator(tag) {
                    Some(self.application(function, &operands)?)
                } else {
                    Some(self.generic(function, &operands, &qualifiers)?)
                }
            }
            _ => {
                let head = self.operator_head(head)?;
                Some(self.generic(head, &operands, &qualifiers)?)
            }
        };
        Ok(node)
    }

    fn operator_head(&mut self, head: &Element) -> Result<NodeId, ConvertError> {
        let node = self.normalize(head)?;
        Ok(self.base(node))
    }

    fn optional(&mut self, elem: Option<&Element>) -> Result<Option<NodeId>, ConvertError> {
        match elem {
            Some(elem) => self.normalize(elem),
            None => Ok(None),
        }
    }

    fn cells_of(&mut self, elems: &[&Element]) -> Result<Vec<NodeId>, ConvertError> {
        let mut cells = Vec::with_capacity(elems.len());
        for &elem in elems {
            let cell = self.normalize(elem)?;
            cells.push(self.base(cell));
        }
        Ok(cells)
    }

    /// The operands as one row.
    fn operand_row(&mut self, operands: &[&Element]) -> Result<Option<NodeId>, ConvertError> {
        let mut kept = Vec::with_capacity(operands.len());
        for &operand in operands {
            let node = self.normalize(operand)?;
            if !self.is_ignorable(node) {
                kept.extend(node);
            }
        }
        Ok(self.splice(&kept))
    }

    /// `base` with the script on `edge`.
    fn scripted(
        &mut self,
        operands: &[&Element],
        edge: Edge,
    ) -> Result<Option<NodeId>, ConvertError> {
        let [base, script] = operands else {
            return self.operand_row(operands);
        };
        let base = self.normalize(base)?;
        let base = self.base(base);
        let script = self.normalize(script)?;
        Ok(Some(self.attach(base, &[edge], &[script])))
    }

    /// `f` followed by the parenthesized arguments.
    fn application(
        &mut self,
        function: NodeId,
        operands: &[&Element],
    ) -> Result<NodeId, ConvertError> {
        let cells = self.cells_of(operands)?;
        let arguments = self
            .fenced_cells(format!("{MATRIX}()1x{}", cells.len()), &cells);
        let end = self.tree.last_along(function, Edge::Next);
        self.tree.set_child(end, Edge::Next, Some(arguments));
        Ok(function)
    }

    /// An operator with its operands as consecutive cells of `within`.
    ///
    /// A compound head is wrapped in a matrix of one and applied to its operands instead.
    fn generic(
        &mut self,
        head: NodeId,
        operands: &[&Element],
        qualifiers: &Qualifiers<'_>,
    ) -> Result<NodeId, ConvertError> {
        let root = if self.tree.has_any(head, &[Edge::Next, Edge::Within, Edge::Element]) {
            let wrapper = self.make_matrix(vec![Some(head)]);
            self.application(wrapper, operands)?
        } else {
            let cells = self.cells_of(operands)?;
            let first = self.chain_cells(&cells);
            self.tree.set_child(head, Edge::Within, first);
            head
        };
        self.qualify(root, qualifiers)?;
        Ok(root)
    }

    /// Attaches bound variables, limits and degree to the edges the operator leaves free.
    fn qualify(&mut self, root: NodeId, qualifiers: &Qualifiers<'_>) -> Result<(), ConvertError> {
        let mut variables = Vec::with_capacity(qualifiers.variables.len());
        for &variable in &qualifiers.variables {
            let node = self.normalize(variable)?;
            variables.extend(node);
        }
        let variable = self.splice(&variables);
        let slots = [
            (Edge::Variable, variable),
            (Edge::Below, self.optional(qualifiers.lower)?),
            (Edge::Above, self.optional(qualifiers.upper)?),
            (Edge::PreAbove, self.optional(qualifiers.degree)?),
        ];
        for (edge, node) in slots {
            if node.is_some() && self.tree.child(root, edge).is_none() {
                self.tree.set_child(root, edge, node);
            }
        }
        Ok(())
    }

    /// Integrals, sums, products and limits: the body on `within`, the bound variable on
    /// `variable` and the limits on `below` and `above`.
    ///
    /// For integrals without a bound variable, a differential factor of the integrand supplies
    /// the variable. A compound head is wrapped in a matrix of one, followed by the body.
    fn big_operator<'e>(
        &mut self,
        head: NodeId,
        integral: bool,
        operands: &[&'e Element],
        qualifiers: &Qualifiers<'e>,
    ) -> Result<NodeId, ConvertError> {
        let (root, body_edge) =
            if self.tree.has_any(head, &[Edge::Next, Edge::Within, Edge::Variable]) {
                (self.make_matrix(vec![Some(head)]), Edge::Next)
            } else {
                (head, Edge::Within)
            };

        let mut operands = operands.to_vec();
        let mut qualifiers = qualifiers.clone();
        if operands.len() > 1 && operands[0].name() == "interval" {
            let interval = operands.remove(0);
            let mut limits = interval.children().iter();
            qualifiers.lower = qualifiers.lower.or(limits.next());
            qualifiers.upper = qualifiers.upper.or(limits.next());
        }

        let mut differential = None;
        if integral
            && qualifiers.variables.is_empty()
            && let [integrand] = operands.as_slice()
            && let Some((factors, variable)) = split_differential(integrand)
        {
            differential = Some(variable);
            let body = if let [factor] = factors.as_slice() {
                self.normalize(factor)?
            } else {
                let times = self.tree.push("×");
                let cells = self.cells_of(&factors)?;
                let first = self.chain_cells(&cells);
                self.tree.set_child(times, Edge::Within, first);
                Some(times)
            };
            self.tree.set_child(root, body_edge, body);
        } else {
            let body = self.operand_row(&operands)?;
            self.tree.set_child(root, body_edge, body);
        }
        if let Some(variable) = differential {
            let variable = self.normalize(variable)?;
            self.tree.set_child(root, Edge::Variable, variable);
        }
        self.qualify(root, &qualifiers)?;
        Ok(root)
    }
}

/// Splits `f dx`, written as a product with a `differential-d` factor, into the remaining
/// factors and the variable.
fn split_differential(integrand: &Element) -> Option<(Vec<&Element>, &Element)> {
    let (head, factors) = integrand.children().split_first()?;
    if integrand.name() != "apply" || head.name() != "times" {
        return None;
    }
    let position = factors.iter().position(is_differential)?;
    let variable = factors[position].children().get(1)?;
    let rest: Vec<&Element> = factors
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != position)
        .map(|(_, factor)| factor)
        .collect();
    if rest.is_empty() {
        return None;
    }
    Some((rest, variable))
}

fn is_differential(elem: &Element) -> bool {
    elem.name() == "apply"
        && elem.children().first().is_some_and(|head| {
            (head.name() == "csymbol" && head.text().trim() == "differential-d")
                || head.name() == "diff"
        })
}
