//! Conversion of Presentation MathML elements into symbol trees.
//!
//! The Content MathML rules live in [`crate::content`] and share the helpers defined here.
use mathml_reader::Element;

use crate::MAX_DEPTH;
use crate::error::{ConvertErrKind, ConvertError};
use crate::tag::{
    ERROR, FRACTION, MATRIX, NUMBER, RADICAL, TEXT, VARIABLE, WHITESPACE, clean, is_non_operator,
};
use crate::tree::{Edge, NodeId, SymbolTree};

/// Tags of opening fences that turn a row into a fenced group.
const FENCES: [&str; 5] = ["(", "{", "|", "∥", "&lsqb;"];

/// Edges whose presence keeps a matrix from absorbing the fences around it.
const LAYOUT_EDGES: [Edge; 7] = [
    Edge::Next,
    Edge::Above,
    Edge::Below,
    Edge::Over,
    Edge::Under,
    Edge::PreAbove,
    Edge::PreBelow,
];

/// Builds the symbol tree of a `math` element.
pub(crate) fn symbol_tree(root: &Element) -> Result<SymbolTree, ConvertError> {
    let mut tree = SymbolTree::new();
    let root = Normalizer::new(&mut tree).normalize(root)?;
    tree.set_root(root);
    Ok(tree)
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Scripts {
    Sub,
    Sup,
    SubSup,
    Under,
    Over,
    UnderOver,
}

impl Scripts {
    fn arity(self) -> usize {
        match self {
            Scripts::SubSup | Scripts::UnderOver => 3,
            _ => 2,
        }
    }

    /// The edges the scripts hang from, for an operand base or an operator base.
    fn edges(self, operand: bool) -> &'static [Edge] {
        match (self, operand) {
            (Scripts::Sub, true) => &[Edge::Below],
            (Scripts::Sup, true) => &[Edge::Above],
            (Scripts::SubSup, true) => &[Edge::Below, Edge::Above],
            (Scripts::Sub, false) | (Scripts::Under, _) => &[Edge::Under],
            (Scripts::Sup, false) | (Scripts::Over, _) => &[Edge::Over],
            (Scripts::SubSup, false) | (Scripts::UnderOver, _) => &[Edge::Under, Edge::Over],
        }
    }
}

pub(crate) struct Normalizer<'t> {
    pub(crate) tree: &'t mut SymbolTree,
    depth: usize,
}

impl<'t> Normalizer<'t> {
    pub(crate) fn new(tree: &'t mut SymbolTree) -> Self {
        Normalizer { tree, depth: 0 }
    }

    /// Converts an element; `None` stands for markup without any symbol.
    pub(crate) fn normalize(&mut self, elem: &Element) -> Result<Option<NodeId>, ConvertError> {
        if self.depth >= MAX_DEPTH {
            return Err(ConvertError(
                elem.span(),
                ConvertErrKind::DepthLimitExceeded,
            ));
        }
        self.depth += 1;
        let node = self.presentation(elem);
        self.depth -= 1;
        node
    }

    fn presentation(&mut self, elem: &Element) -> Result<Option<NodeId>, ConvertError> {
        let node = match elem.name() {
            "math" | "mrow" | "mstyle" | "mpadded" | "annotation-xml" => self.row(elem)?,
            "semantics" | "maction" => match elem.children().first() {
                Some(child) => self.normalize(child)?,
                None => None,
            },
            "mi" => self.marked(VARIABLE, elem.text()),
            "mn" => self.marked(NUMBER, elem.text()),
            "mo" => self.leaf(clean(elem.text())),
            "mtext" | "ms" => self.marked(TEXT, elem.text()),
            "merror" => self.marked(ERROR, elem.text()),
            "mspace" | "none" | "mphantom" | "mglyph" | "malignmark" | "maligngroup"
            | "mprescripts" | "msline" => self.leaf(WHITESPACE),
            "mqvar" | "qvar" => {
                let name = match elem.attribute("name") {
                    Some(name) => name.to_string(),
                    None => clean(elem.text()),
                };
                self.leaf(format!("?{name}"))
            }
            "msqrt" => {
                let children = self.normalized(elem)?;
                if children.is_empty() {
                    self.leaf(WHITESPACE)
                } else {
                    let present: Vec<NodeId> = children.into_iter().flatten().collect();
                    let inner = match self.splice(&present) {
                        Some(inner) => inner,
                        None => self.tree.push(WHITESPACE),
                    };
                    let root = self.tree.push(RADICAL);
                    self.tree.set_child(root, Edge::Within, Some(inner));
                    Some(root)
                }
            }
            "mroot" => self.binary(elem, RADICAL, [Edge::Within, Edge::PreAbove])?,
            "mfrac" => self.binary(elem, FRACTION, [Edge::Over, Edge::Under])?,
            "msub" => self.scripts(elem, Scripts::Sub)?,
            "msup" => self.scripts(elem, Scripts::Sup)?,
            "msubsup" => self.scripts(elem, Scripts::SubSup)?,
            "munder" => self.scripts(elem, Scripts::Under)?,
            "mover" => self.scripts(elem, Scripts::Over)?,
            "munderover" => self.scripts(elem, Scripts::UnderOver)?,
            "mmultiscripts" => self.multiscripts(elem)?,
            "menclose" => {
                let root = self
                    .tree
                    .push(elem.attribute("notation").unwrap_or("longdiv"));
                let kept = self.kept(elem)?;
                let inner = self.splice(&kept);
                self.tree.set_child(root, Edge::Within, inner);
                Some(root)
            }
            "mfenced" => self.fenced(elem)?,
            "mtable" | "mstack" | "mlongdiv" | "msgroup" => {
                let rows = self.normalized(elem)?;
                Some(self.make_matrix(rows))
            }
            "mtr" | "msrow" | "mscarries" => self.table_row(elem, 0)?,
            "mlabeledtr" => self.table_row(elem, 1)?,
            "mtd" | "mscarry" => self.cell(elem)?,
            _ => self.content(elem)?,
        };
        Ok(node)
    }

    #[inline]
    pub(crate) fn leaf(&mut self, tag: impl Into<String>) -> Option<NodeId> {
        Some(self.tree.push(tag))
    }

    /// A leaf tagged `marker` + the cleaned text, or whitespace when there is no text.
    pub(crate) fn marked(&mut self, marker: &str, text: &str) -> Option<NodeId> {
        let text = clean(text);
        if text.is_empty() {
            self.leaf(WHITESPACE)
        } else {
            self.leaf(marker.to_string() + &text)
        }
    }

    /// Whether a converted child carries no symbol: absent, or an empty or whitespace leaf.
    pub(crate) fn is_ignorable(&self, node: Option<NodeId>) -> bool {
        match node {
            None => true,
            Some(id) => {
                matches!(self.tree.tag(id), "" | WHITESPACE) && self.tree.is_leaf(id)
            }
        }
    }

    /// Converts all children of an element.
    pub(crate) fn normalized(
        &mut self,
        elem: &Element,
    ) -> Result<Vec<Option<NodeId>>, ConvertError> {
        elem.children()
            .iter()
            .map(|child| self.normalize(child))
            .collect()
    }

    /// Converts all children of an element and drops the ignorable ones.
    pub(crate) fn kept(&mut self, elem: &Element) -> Result<Vec<NodeId>, ConvertError> {
        let children = self.normalized(elem)?;
        Ok(self.without_ignorable(children))
    }

    pub(crate) fn without_ignorable(&self, children: Vec<Option<NodeId>>) -> Vec<NodeId> {
        children
            .into_iter()
            .filter(|&child| !self.is_ignorable(child))
            .flatten()
            .collect()
    }

    /// Links the nodes into one row and returns its first node.
    pub(crate) fn splice(&mut self, nodes: &[NodeId]) -> Option<NodeId> {
        let (&first, rest) = nodes.split_first()?;
        let mut tail = first;
        for &node in rest {
            let end = self.tree.last_along(tail, Edge::Next);
            self.tree.set_child(end, Edge::Next, Some(node));
            tail = node;
        }
        Some(first)
    }

    /// Links the nodes as consecutive cells and returns the first one.
    pub(crate) fn chain_cells(&mut self, cells: &[NodeId]) -> Option<NodeId> {
        for pair in cells.windows(2) {
            self.tree.set_child(pair[0], Edge::Element, Some(pair[1]));
        }
        cells.first().copied()
    }

    fn row(&mut self, elem: &Element) -> Result<Option<NodeId>, ConvertError> {
        let children = self.kept(elem)?;
        let Some(&first) = children.first() else {
            return Ok(None);
        };
        if children.len() > 1 && FENCES.contains(&self.tree.tag(first)) {
            return Ok(Some(self.list_to_matrix(&children, &[","])));
        }
        let mut current = first;
        for (i, &child) in children.iter().enumerate().skip(1) {
            let tag = self.tree.tag(current);
            let child_tag = self.tree.tag(child);
            if tag.starts_with(MATRIX) && child_tag.starts_with(MATRIX) {
                current = self.merge_matrices(current, child);
            } else if i == 1 && matches!(tag, "-" | "−") && child_tag.starts_with(NUMBER) {
                let negated = format!("{NUMBER}-{}", &child_tag[NUMBER.len()..]);
                self.tree.set_tag(first, negated);
            } else {
                let end = self.tree.last_along(current, Edge::Next);
                self.tree.set_child(end, Edge::Next, Some(child));
                current = child;
            }
        }
        Ok(Some(first))
    }

    /// `mfrac` and `mroot`: a node with the two children on the given edges, or a plain row
    /// when the number of children is off.
    fn binary(
        &mut self,
        elem: &Element,
        tag: &str,
        edges: [Edge; 2],
    ) -> Result<Option<NodeId>, ConvertError> {
        let children = self.normalized(elem)?;
        match children.len() {
            0 => Ok(None),
            2 => {
                let root = self.tree.push(tag);
                self.tree.set_child(root, edges[0], children[0]);
                self.tree.set_child(root, edges[1], children[1]);
                Ok(Some(root))
            }
            _ => {
                let kept = self.without_ignorable(children);
                Ok(self.splice(&kept))
            }
        }
    }

    fn scripts(&mut self, elem: &Element, kind: Scripts) -> Result<Option<NodeId>, ConvertError> {
        let children = self.normalized(elem)?;
        if children.is_empty() {
            return Ok(None);
        }
        if children.len() != kind.arity() {
            let kept = self.without_ignorable(children);
            return Ok(self.splice(&kept));
        }
        let base = self.base(children[0]);
        let edges = kind.edges(is_non_operator(self.tree.tag(base)));
        Ok(Some(self.attach(base, edges, &children[1..])))
    }

    /// The base of a scripted element, with a whitespace node standing in for a missing one.
    pub(crate) fn base(&mut self, node: Option<NodeId>) -> NodeId {
        match node {
            Some(id) if !self.is_ignorable(node) => id,
            _ => self.tree.push(WHITESPACE),
        }
    }

    /// Hangs the scripts from the base, first wrapping the base in a one-cell matrix if it
    /// continues its row or already has one of the edges.
    pub(crate) fn attach(
        &mut self,
        base: NodeId,
        edges: &[Edge],
        scripts: &[Option<NodeId>],
    ) -> NodeId {
        let conflict = self.tree.child(base, Edge::Next).is_some() || self.tree.has_any(base, edges);
        let root = if conflict {
            self.make_matrix(vec![Some(base)])
        } else {
            base
        };
        for (&edge, &script) in edges.iter().zip(scripts) {
            self.tree.set_child(root, edge, script);
        }
        root
    }

    fn multiscripts(&mut self, elem: &Element) -> Result<Option<NodeId>, ConvertError> {
        let Some((base, rest)) = elem.children().split_first() else {
            return Ok(None);
        };
        let base = self.normalize(base)?;
        let base = self.base(base);
        let split = rest
            .iter()
            .position(|child| child.name() == "mprescripts")
            .unwrap_or(rest.len());
        let post = rest[..split]
            .iter()
            .map(|child| self.normalize(child))
            .collect::<Result<Vec<_>, _>>()?;
        let pre = rest
            .get(split + 1..)
            .unwrap_or_default()
            .iter()
            .map(|child| self.normalize(child))
            .collect::<Result<Vec<_>, _>>()?;

        let (below, above) = self.script_rows(&post);
        self.tree.set_child(base, Edge::Below, below);
        self.tree.set_child(base, Edge::Above, above);
        if pre.len() >= 2 {
            let (pre_below, pre_above) = self.script_rows(&pre);
            self.tree.set_child(base, Edge::PreBelow, pre_below);
            self.tree.set_child(base, Edge::PreAbove, pre_above);
        }
        Ok(Some(base))
    }

    /// Splits alternating subscripts and superscripts into two rows.
    ///
    /// Missing scripts keep their place as whitespace unless no later pair follows.
    fn script_rows(&mut self, scripts: &[Option<NodeId>]) -> (Option<NodeId>, Option<NodeId>) {
        let pairs = scripts.len().div_ceil(2);
        let mut subs = Vec::new();
        let mut sups = Vec::new();
        for (i, pair) in scripts.chunks(2).enumerate() {
            let later = i + 1 < pairs;
            if let Some(sub) = self.script(pair[0], later) {
                subs.push(sub);
            }
            if let Some(sup) = pair.get(1).and_then(|&sup| self.script(sup, later)) {
                sups.push(sup);
            }
        }
        (self.splice(&subs), self.splice(&sups))
    }

    fn script(&mut self, node: Option<NodeId>, later: bool) -> Option<NodeId> {
        match node {
            Some(id) if later || self.tree.tag(id) != WHITESPACE => Some(id),
            None if later => Some(self.tree.push(WHITESPACE)),
            _ => None,
        }
    }

    fn fenced(&mut self, elem: &Element) -> Result<Option<NodeId>, ConvertError> {
        let open = match elem.attribute("open") {
            None => "(",
            Some("[") => "&lsqb;",
            Some(open) => open,
        };
        let close = match elem.attribute("close") {
            None => ")",
            Some("]") => "&rsqb;",
            Some(close) => close,
        };
        let separators: Vec<&str> = elem
            .attribute("separators")
            .unwrap_or(",")
            .split_whitespace()
            .collect();

        let children = self.kept(elem)?;
        let mut row = vec![self.tree.push(open)];
        for (i, &child) in children.iter().enumerate() {
            if i > 0
                && let Some(&separator) = separators.get((i - 1).min(separators.len().saturating_sub(1)))
            {
                row.push(self.tree.push(separator));
            }
            row.push(child);
        }
        row.push(self.tree.push(close));
        Ok(Some(self.list_to_matrix(&row, &separators)))
    }

    fn separates(&self, node: NodeId, separators: &[&str]) -> bool {
        let tag = self.tree.tag(node);
        separators.contains(&tag) || (tag == "&comma;" && separators.contains(&","))
    }

    /// Whether the node is a bare matrix that can take the fences around it into its tag.
    fn is_invisible_matrix(&self, node: NodeId) -> bool {
        let tag = self.tree.tag(node);
        tag.starts_with(MATRIX)
            && !tag[MATRIX.len()..].starts_with(['(', '{', '|', '&', '∥'])
            && !self.tree.has_any(node, &LAYOUT_EDGES)
    }

    /// Turns a fenced row `[open, ..., close]` into a single-row matrix whose cells are the
    /// pieces between separators.
    fn list_to_matrix(&mut self, children: &[NodeId], separators: &[&str]) -> NodeId {
        let len = children.len();
        let open = self.tree.tag(children[0]).to_string();
        if (2..4).contains(&len) && self.is_invisible_matrix(children[1]) {
            let inner = children[1];
            let mut fences = open;
            if len == 3 {
                fences.push_str(self.tree.tag(children[2]));
            }
            let dimensions = &self.tree.tag(inner)[MATRIX.len()..];
            let tag = format!("{MATRIX}{fences}{dimensions}");
            self.tree.set_tag(inner, tag);
            return inner;
        }

        let close = if len > 1 {
            self.tree.tag(children[len - 1]).to_string()
        } else {
            String::new()
        };
        let matrix = self.tree.push(MATRIX);
        if len <= 2 {
            self.tree.set_tag(matrix, format!("{MATRIX}{open}{close}"));
            return matrix;
        }

        let mut items: Vec<Option<NodeId>> = children.iter().copied().map(Some).collect();
        let within = if self.separates(children[1], separators) {
            let blank = self.tree.push(WHITESPACE);
            if len == 3 {
                self.tree.set_child(blank, Edge::Next, Some(children[1]));
            } else {
                items.insert(1, None);
            }
            blank
        } else {
            children[1]
        };
        self.tree.set_child(matrix, Edge::Within, Some(within));

        let mut args = 1;
        let mut cell = within;
        let mut expr = within;
        if len == 3 {
            while let Some(next) = self.tree.child(expr, Edge::Next) {
                if !self.separates(next, separators) {
                    expr = next;
                    continue;
                }
                args += 1;
                let following = self.tree.child(next, Edge::Next);
                self.tree.set_child(cell, Edge::Element, following);
                self.tree.set_child(expr, Edge::Next, None);
                let Some(following) = following else {
                    break;
                };
                cell = following;
                expr = following;
            }
        } else {
            for i in 2..items.len() - 1 {
                let Some(item) = items[i] else {
                    continue;
                };
                if self.separates(item, separators) {
                    args += 1;
                    expr = self.tree.last_along(expr, Edge::Next);
                } else if items[i - 1].is_some_and(|prev| self.separates(prev, separators)) {
                    self.tree.set_child(cell, Edge::Element, Some(item));
                    cell = item;
                    expr = item;
                } else {
                    expr = self.tree.last_along(expr, Edge::Next);
                    self.tree.set_child(expr, Edge::Next, Some(item));
                }
            }
        }
        self.tree
            .set_tag(matrix, format!("{MATRIX}{open}{close}1x{args}"));
        matrix
    }

    /// Lays out rows of cells as an `M!RxC` matrix, padding short rows with whitespace cells.
    pub(crate) fn make_matrix(&mut self, rows: Vec<Option<NodeId>>) -> NodeId {
        let rows: Vec<NodeId> = rows
            .into_iter()
            .map(|row| row.unwrap_or_else(|| self.tree.push(WHITESPACE)))
            .collect();
        let widths: Vec<usize> = rows.iter().map(|&row| self.row_width(row)).collect();
        let columns = widths.iter().copied().max().unwrap_or(0);
        for (&row, &width) in rows.iter().zip(&widths) {
            let mut tail = self.tree.last_along(row, Edge::Element);
            for _ in width..columns {
                let pad = self.tree.push(WHITESPACE);
                self.tree.set_child(tail, Edge::Element, Some(pad));
                tail = pad;
            }
        }
        for pair in rows.windows(2) {
            let tail = self.tree.last_along(pair[0], Edge::Element);
            self.tree.set_child(tail, Edge::Element, Some(pair[1]));
        }
        let matrix = self
            .tree
            .push(format!("{MATRIX}{}x{columns}", rows.len()));
        self.tree.set_child(matrix, Edge::Within, rows.first().copied());
        matrix
    }

    fn row_width(&self, row: NodeId) -> usize {
        let mut width = 1;
        let mut cell = row;
        while let Some(next) = self.tree.child(cell, Edge::Element) {
            width += 1;
            cell = next;
        }
        width
    }

    /// Places the columns of `right` after those of `left` when both have the same plain row
    /// count; otherwise continues the row with `right`. Returns the node the row goes on from.
    fn merge_matrices(&mut self, left: NodeId, right: NodeId) -> NodeId {
        let shapes = (
            matrix_shape(self.tree.tag(left)),
            matrix_shape(self.tree.tag(right)),
        );
        let (Some((rows, left_cols)), Some((right_rows, right_cols))) = shapes else {
            return self.continue_row(left, right);
        };
        if rows != right_rows {
            return self.continue_row(left, right);
        }
        let tag = format!("{MATRIX}{rows}x{}", left_cols + right_cols);

        let mut left_cell = self.tree.child(left, Edge::Within);
        let mut right_cell = self.tree.child(right, Edge::Within);
        while let (Some(l), Some(r)) = (left_cell, right_cell) {
            let left_end = self.advance(l, left_cols.saturating_sub(1));
            let next_left = self.tree.child(left_end, Edge::Element);
            self.tree.set_child(left_end, Edge::Element, Some(r));
            let right_end = self.advance(r, right_cols.saturating_sub(1));
            let next_right = self.tree.child(right_end, Edge::Element);
            self.tree.set_child(right_end, Edge::Element, next_left);
            left_cell = next_left;
            right_cell = next_right;
        }
        self.tree.set_tag(left, tag);
        left
    }

    fn continue_row(&mut self, current: NodeId, child: NodeId) -> NodeId {
        let end = self.tree.last_along(current, Edge::Next);
        self.tree.set_child(end, Edge::Next, Some(child));
        child
    }

    fn advance(&self, mut cell: NodeId, steps: usize) -> NodeId {
        for _ in 0..steps {
            match self.tree.child(cell, Edge::Element) {
                Some(next) => cell = next,
                None => break,
            }
        }
        cell
    }

    fn table_row(&mut self, elem: &Element, skip: usize) -> Result<Option<NodeId>, ConvertError> {
        let cells: Vec<NodeId> = self
            .normalized(elem)?
            .into_iter()
            .skip(skip)
            .map(|cell| cell.unwrap_or_else(|| self.tree.push(WHITESPACE)))
            .collect();
        match self.chain_cells(&cells) {
            Some(first) => Ok(Some(first)),
            None => Ok(self.leaf(WHITESPACE)),
        }
    }

    fn cell(&mut self, elem: &Element) -> Result<Option<NodeId>, ConvertError> {
        let mut children: Vec<NodeId> = self.normalized(elem)?.into_iter().flatten().collect();
        if children
            .last()
            .is_some_and(|&last| self.tree.tag(last) == "&comma;")
        {
            children.pop();
        }
        let Some(root) = self.splice(&children) else {
            return Ok(self.leaf(WHITESPACE));
        };
        let mut node = root;
        while let Some(next) = self.tree.child(node, Edge::Next) {
            if self.tree.tag(next) == "&comma;" && self.tree.child(next, Edge::Next).is_none() {
                self.tree.set_child(node, Edge::Next, None);
                break;
            }
            node = next;
        }
        Ok(Some(root))
    }
}

/// The row count (as written) and column count of an `M!RxC` tag with a plain decimal row count.
fn matrix_shape(tag: &str) -> Option<(String, usize)> {
    let (rows, columns) = tag.strip_prefix(MATRIX)?.split_once('x')?;
    if rows.is_empty() || !rows.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((rows.to_string(), columns.parse().ok()?))
}
