//! Conceptual table reconstruction.
//!
//! A GETNEXT walk over a table returns cells column by column:
//! `root.C.idx` for every row of column `C`, then column `C+1`, and so on.
//! [`TableBuilder`] lays those bindings out as a grid without needing the
//! table's index structure.
//!
//! # Example
//!
//! ```
//! use snmp_watch::{oid, Value, VarBind, VarBindDecoder};
//! use snmp_watch::table::TableGrid;
//!
//! let root = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1);
//! let walk = vec![
//!     VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 1), Value::Integer(1)),
//!     VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 2), Value::Integer(2)),
//!     VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 1), Value::from("lo")),
//!     VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 2), Value::from("eth0")),
//! ];
//!
//! let grid = TableGrid::from_walk(root, &walk, &VarBindDecoder::default()).unwrap();
//! assert_eq!(grid.column_count(), 2);
//! assert_eq!(grid.row_count(), 2);
//! assert_eq!(grid.cell(1, 1), Some("eth0"));
//! ```

use std::collections::HashSet;

use crate::decode::VarBindDecoder;
use crate::error::{Error, Result, TableErrorKind};
use crate::oid::Oid;
use crate::varbind::VarBind;

/// One registered column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    /// Zero-based column number taken from the OID (first arc below root, minus one).
    pub number: u32,
    /// Column-defining OID, `root` plus the next two arcs.
    pub header: Oid,
}

/// A filled cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell<'a> {
    pub row: usize,
    pub column: &'a Oid,
    pub text: &'a str,
}

/// Rows and columns reconstructed from a walk.
///
/// Columns appear in the order the walk first reached them. Rows are
/// sparse: a column with fewer instances than its neighbours leaves `None`
/// in the trailing rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableGrid {
    root: Oid,
    columns: Vec<TableColumn>,
    rows: Vec<Vec<Option<String>>>,
}

impl TableGrid {
    /// An empty grid under `root`.
    pub fn new(root: Oid) -> Self {
        Self {
            root,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Build a grid from a complete walk.
    pub fn from_walk<'a, I>(root: Oid, walk: I, decoder: &VarBindDecoder) -> Result<Self>
    where
        I: IntoIterator<Item = &'a VarBind>,
    {
        let mut builder = TableBuilder::new(root, *decoder);
        for vb in walk {
            builder.push(vb)?;
        }
        Ok(builder.finish())
    }

    pub fn root(&self) -> &Oid {
        &self.root
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Text at `(row, position)`, where `position` indexes [`columns`](Self::columns).
    pub fn cell(&self, row: usize, position: usize) -> Option<&str> {
        self.rows.get(row)?.get(position)?.as_deref()
    }

    /// One row, padded to the column count.
    pub fn row(&self, row: usize) -> Option<impl Iterator<Item = Option<&str>> + '_> {
        let cells = self.rows.get(row)?;
        Some((0..self.columns.len()).map(move |i| cells.get(i).and_then(|c| c.as_deref())))
    }

    /// Filled cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = TableCell<'_>> + '_ {
        self.rows.iter().enumerate().flat_map(move |(row, cells)| {
            cells.iter().enumerate().filter_map(move |(position, text)| {
                Some(TableCell {
                    row,
                    column: &self.columns[position].header,
                    text: text.as_deref()?,
                })
            })
        })
    }

    /// Drop all rows and columns, keeping the root.
    pub fn clear(&mut self) {
        self.columns.clear();
        self.rows.clear();
    }

    fn set(&mut self, row: usize, position: usize, text: String) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= position {
            cells.resize(position + 1, None);
        }
        cells[position] = Some(text);
    }
}

/// Incremental grid construction from walk bindings.
#[derive(Debug)]
pub struct TableBuilder {
    decoder: VarBindDecoder,
    grid: TableGrid,
    current: Option<(u32, usize)>,
    row: usize,
    seen: HashSet<u32>,
}

impl TableBuilder {
    pub fn new(root: Oid, decoder: VarBindDecoder) -> Self {
        Self {
            decoder,
            grid: TableGrid::new(root),
            current: None,
            row: 0,
            seen: HashSet::new(),
        }
    }

    /// Place one binding.
    ///
    /// On error the builder is left as it was before the call.
    pub fn push(&mut self, vb: &VarBind) -> Result<()> {
        let decoded = self.decoder.decode(vb)?;
        let root = &self.grid.root;
        let cut = vb.oid.cut_common_root(root)?;
        let arc = cut.level_value(1).map_err(|_| Error::TableLayout {
            oid: vb.oid.clone(),
            kind: TableErrorKind::NoColumn,
        })?;
        let number = arc.checked_sub(1).ok_or_else(|| Error::TableLayout {
            oid: vb.oid.clone(),
            kind: TableErrorKind::ZeroColumn,
        })?;

        let (row, position) = match self.current {
            Some((prev, position)) if prev == number => (self.row + 1, position),
            _ => {
                if self.seen.contains(&number) {
                    return Err(Error::TableLayout {
                        oid: vb.oid.clone(),
                        kind: TableErrorKind::ColumnReentered {
                            column: number as usize,
                        },
                    });
                }
                let header = vb.oid.cut_after_level(root.levels() + 2);
                self.seen.insert(number);
                self.grid.columns.push(TableColumn { number, header });
                (0, self.grid.columns.len() - 1)
            }
        };

        self.grid.set(row, position, decoded.text);
        self.current = Some((number, position));
        self.row = row;
        Ok(())
    }

    /// Grid built so far.
    pub fn grid(&self) -> &TableGrid {
        &self.grid
    }

    pub fn finish(self) -> TableGrid {
        self.grid
    }
}
