// Copyright 2026 The MinimumAnswers developers.
// This file is part of MinimumAnswers.
// MinimumAnswers is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MinimumAnswers is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MinimumAnswers.  If not, see <https://www.gnu.org/licenses/>.


//! An ordered multiset that counts how many times each distinct value has been seen.
//! Used to tally votes, and to audit the rolls made by the random source.
//!
//! Values are kept in order of first insertion. This order matters: whenever several values
//! share the same count, ranking operations favour the one inserted first.


use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Serialize,Deserialize};
use thiserror::Error;

/// The margin reported for a counter with nothing in it.
pub const MARGIN_NO_DATA : isize = -1;
/// The margin reported by [top_two_difference] when there is no counter at all.
pub const MARGIN_NO_COUNTER : isize = -2;

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum CounterError {
    #[error("Index {index} is out of bounds for a counter holding {len} distinct values")]
    IndexOutOfBounds{index:usize,len:usize},
    #[error("The value at index {0} is already stored at another index")]
    DuplicateValue(usize),
}

/// A multiset remembering insertion order. Each distinct value is stored once, with a count.
#[derive(Clone,Debug,Serialize,Deserialize)]
#[serde(transparent)]
pub struct OccurrenceCounter<T> {
    entries : Vec<(T,isize)>,
}

impl <T> Default for OccurrenceCounter<T> {
    fn default() -> Self { OccurrenceCounter{entries:vec![]} }
}

impl <T> OccurrenceCounter<T> {
    pub fn new() -> Self { Self::default() }

    /// The number of distinct values.
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// The sum of all the counts, as opposed to the number of distinct values.
    pub fn total_weighted(&self) -> isize { self.entries.iter().map(|(_,n)|*n).sum() }

    /// The value stored at position i (insertion order).
    pub fn get(&self,i:usize) -> Option<&T> { self.entries.get(i).map(|(v,_)|v) }
    /// The count of the value stored at position i (insertion order).
    pub fn count_at(&self,i:usize) -> Option<isize> { self.entries.get(i).map(|(_,n)|*n) }

    /// Like get and count_at together, but an out of range position is an error.
    pub fn entry(&self,i:usize) -> Result<(&T,isize),CounterError> {
        self.entries.get(i).map(|(v,n)|(v,*n)).ok_or(CounterError::IndexOutOfBounds{index:i,len:self.len()})
    }

    pub fn iter(&self) -> impl Iterator<Item=(&T,isize)> { self.entries.iter().map(|(v,n)|(v,*n)) }
    pub fn values(&self) -> impl Iterator<Item=&T> { self.entries.iter().map(|(v,_)|v) }

    /// The largest count of any value, or 0 if empty.
    pub fn highest_individual_count(&self) -> isize { self.entries.iter().map(|(_,n)|*n).max().unwrap_or(0).max(0) }
    /// The smallest count of any value, or None if empty.
    pub fn lowest_individual_count(&self) -> Option<isize> { self.entries.iter().map(|(_,n)|*n).min() }

    /// Remove the value at position i, returning it and its count.
    pub fn remove_at(&mut self,i:usize) -> Result<(T,isize),CounterError> {
        if i<self.len() { Ok(self.entries.remove(i)) } else { Err(CounterError::IndexOutOfBounds{index:i,len:self.len()}) }
    }

    /// The difference in count between the most common value and the second most common value.
    ///
    /// * [MARGIN_NO_DATA] if the counter is empty.
    /// * The count of the only value if there is just one (the second place is taken to be 0).
    /// * 0 if two or more values tie for the top.
    ///
    /// Only counts matter here, so this does not need to work out the ranking.
    pub fn margin_top_two(&self) -> isize {
        let mut counts = self.entries.iter().map(|(_,n)|*n);
        let Some(first) = counts.next() else { return MARGIN_NO_DATA };
        let mut highest = first;
        let mut second : Option<isize> = None;
        for n in counts {
            if n>highest {
                second=Some(highest);
                highest=n;
            } else if second.is_none_or(|s|n>s) {
                second=Some(n);
            }
        }
        match second {
            None => highest,
            Some(second) => highest-second,
        }
    }
}

impl <T:PartialEq> OccurrenceCounter<T> {
    pub fn index_of(&self,value:&T) -> Option<usize> { self.entries.iter().position(|(v,_)|v==value) }
    pub fn contains(&self,value:&T) -> bool { self.index_of(value).is_some() }

    /// The count for a value, 0 if it has never been added.
    pub fn count(&self,value:&T) -> isize { self.index_of(value).map(|i|self.entries[i].1).unwrap_or(0) }

    /// Add a value once. Returns true if it is new, false if an existing count was incremented.
    pub fn add(&mut self,value:T) -> bool { self.add_n(value,1) }

    /// Increase the count for a value by exactly n (which may be any integer), inserting it with count n if new.
    /// Returns true if the value is new.
    pub fn add_n(&mut self,value:T,n:isize) -> bool {
        match self.index_of(&value) {
            Some(i) => { self.entries[i].1+=n; false }
            None => { self.entries.push((value,n)); true }
        }
    }

    /// Force the count for a value to be n, inserting it if needed. Returns true if the value is new.
    pub fn set_count(&mut self,value:T,n:isize) -> bool {
        match self.index_of(&value) {
            Some(i) => { self.entries[i].1=n; false }
            None => { self.entries.push((value,n)); true }
        }
    }

    /// Add `by` to the count of an existing value, returning the new count. None if the value is not present.
    pub fn increment(&mut self,value:&T,by:isize) -> Option<isize> {
        let i = self.index_of(value)?;
        self.entries[i].1+=by;
        Some(self.entries[i].1)
    }

    /// Replace the value and count at position i, returning what was there.
    pub fn set_at(&mut self,i:usize,value:T,count:isize) -> Result<(T,isize),CounterError> {
        if i>=self.len() { return Err(CounterError::IndexOutOfBounds{index:i,len:self.len()}) }
        if let Some(existing) = self.index_of(&value) {
            if existing!=i { return Err(CounterError::DuplicateValue(existing)) }
        }
        Ok(std::mem::replace(&mut self.entries[i],(value,count)))
    }

    /// Add every value. Returns true if at least one of them was new.
    pub fn add_all<I:IntoIterator<Item=T>>(&mut self,values:I) -> bool {
        let mut added = false;
        for v in values { added|=self.add(v); }
        added
    }

    /// Remove a value, returning it with the count it had. None if not present.
    pub fn remove_and_return(&mut self,value:&T) -> Option<(T,isize)> {
        let i = self.index_of(value)?;
        Some(self.entries.remove(i))
    }

    /// true iff every value in self is in other with the identical count.
    pub fn is_subset_of(&self,other:&Self) -> bool {
        self.entries.iter().all(|(v,n)|other.index_of(v).is_some_and(|i|other.entries[i].1==*n))
    }

    /// true iff each is a subset of the other. Insertion order is irrelevant.
    pub fn is_same_as(&self,other:&Self) -> bool { self.is_subset_of(other) && other.is_subset_of(self) }
}

impl <T:Clone> OccurrenceCounter<T> {
    /// A new counter with the same contents, sorted by decreasing count.
    ///
    /// Each output position takes the not yet placed value with the strictly greatest count,
    /// scanning in insertion order, so among equal counts the value inserted first comes first.
    /// This is quadratic, but the number of distinct values (options) is small.
    ///
    /// ```
    /// use plurality::occurrence_counter::OccurrenceCounter;
    /// let mut c = OccurrenceCounter::new();
    /// c.add_n("low",1);
    /// c.add_n("tie1",3);
    /// c.add_n("high",5);
    /// c.add_n("tie2",3);
    /// let ranked = c.ranked_descending();
    /// assert_eq!(vec!["high","tie1","tie2","low"],ranked.as_unique_list());
    /// assert!(ranked.is_same_as(&c));
    /// ```
    pub fn ranked_descending(&self) -> Self {
        let mut placed = vec![false;self.len()];
        let mut res = OccurrenceCounter{entries:Vec::with_capacity(self.len())};
        for _ in 0..self.len() {
            let mut best : Option<usize> = None;
            for (i,(_,n)) in self.entries.iter().enumerate() {
                if !placed[i] && best.is_none_or(|b|*n>self.entries[b].1) { best=Some(i); }
            }
            if let Some(b) = best {
                placed[b]=true;
                res.entries.push(self.entries[b].clone());
            }
        }
        res
    }

    /// The k most common values, clipped to the number available.
    pub fn top(&self,k:usize) -> Self {
        let mut ranked = self.ranked_descending();
        ranked.entries.truncate(k);
        ranked
    }

    /// The distinct values, in insertion order.
    pub fn as_unique_list(&self) -> Vec<T> { self.entries.iter().map(|(v,_)|v.clone()).collect() }

    /// Each value repeated as many times as its count (non-positive counts contribute nothing).
    pub fn as_non_unique_list(&self) -> Vec<T> {
        let mut res = vec![];
        for (v,n) in &self.entries {
            for _ in 0..(*n).max(0) { res.push(v.clone()); }
        }
        res
    }
}

impl <T> OccurrenceCounter<T> {
    /// The most common value. If several share the top count, the first inserted is returned.
    pub fn top_single(&self) -> Option<&T> {
        let mut best : Option<&(T,isize)> = None;
        for e in &self.entries {
            if best.is_none_or(|b|e.1>b.1) { best=Some(e); }
        }
        best.map(|(v,_)|v)
    }
}

/// Margin between first and second place, allowing for there being no counter at all
/// (in which case [MARGIN_NO_COUNTER] is returned). See [OccurrenceCounter::margin_top_two].
pub fn top_two_difference<T>(counter:Option<&OccurrenceCounter<T>>) -> isize {
    match counter {
        None => MARGIN_NO_COUNTER,
        Some(c) => c.margin_top_two(),
    }
}

impl <T:PartialEq> PartialEq for OccurrenceCounter<T> {
    fn eq(&self, other: &Self) -> bool { self.is_same_as(other) }
}

impl <T:PartialEq> FromIterator<T> for OccurrenceCounter<T> {
    fn from_iter<I: IntoIterator<Item=T>>(iter: I) -> Self {
        let mut res = OccurrenceCounter::default();
        res.add_all(iter);
        res
    }
}

impl <T:PartialEq> Extend<T> for OccurrenceCounter<T> {
    fn extend<I: IntoIterator<Item=T>>(&mut self, iter: I) { self.add_all(iter); }
}

impl <T:PartialEq> From<Vec<T>> for OccurrenceCounter<T> {
    fn from(values: Vec<T>) -> Self { values.into_iter().collect() }
}

/// One line per value, `count x value`, each preceded by a newline.
impl <T:Display> Display for OccurrenceCounter<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (v,n) in &self.entries {
            write!(f,"\n{} x {}",n,v)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_of_three_votes() {
        let votes : OccurrenceCounter<&str> = vec!["A","A","B"].into();
        assert_eq!(2,votes.count(&"A"));
        assert_eq!(1,votes.count(&"B"));
        assert_eq!(0,votes.count(&"C"));
        assert_eq!(1,votes.margin_top_two());
        assert_eq!(Some(&"A"),votes.top_single());
        assert_eq!(3,votes.total_weighted());
        assert_eq!(2,votes.len());
    }

    #[test]
    fn add_reports_whether_new() {
        let mut c = OccurrenceCounter::new();
        assert!(c.add('x'));
        assert!(!c.add('x'));
        assert!(c.add_n('y',7));
        assert!(!c.add_n('y',-2));
        assert_eq!(5,c.count(&'y'));
        assert!(!c.set_count('x',10));
        assert!(c.set_count('z',4));
        assert_eq!(10,c.count(&'x'));
        assert_eq!(4,c.count(&'z'));
        assert_eq!(Some(12),c.increment(&'x',2));
        assert_eq!(None,c.increment(&'w',2));
    }

    #[test]
    fn margins() {
        let mut c : OccurrenceCounter<u8> = OccurrenceCounter::new();
        assert_eq!(MARGIN_NO_DATA,c.margin_top_two());
        assert_eq!(MARGIN_NO_COUNTER,top_two_difference::<u8>(None));
        c.add_n(1,4);
        assert_eq!(4,c.margin_top_two());
        c.add_n(2,4);
        assert_eq!(0,c.margin_top_two());
        c.add_n(3,9);
        assert_eq!(5,c.margin_top_two());
        c.add_n(4,9);
        assert_eq!(0,top_two_difference(Some(&c)));
    }

    #[test]
    fn ties_favour_first_inserted() {
        let mut c = OccurrenceCounter::new();
        c.add_n("b",2);
        c.add_n("a",2);
        assert_eq!(Some(&"b"),c.top_single());
        assert_eq!(vec!["b"],c.top(1).as_unique_list());
        let mut d = OccurrenceCounter::new();
        d.add_n("a",2);
        d.add_n("b",2);
        assert_eq!(Some(&"a"),d.top_single());
        assert_eq!(c,d);
    }

    #[test]
    fn top_clips_to_size() {
        let c : OccurrenceCounter<i32> = vec![1,2,2,3,3,3].into();
        let top = c.top(10);
        assert_eq!(vec![3,2,1],top.as_unique_list());
        assert_eq!(vec![3,2],c.top(2).as_unique_list());
        assert!(c.top(0).is_empty());
        assert_eq!(vec![1,2,2,3,3,3],c.as_non_unique_list());
    }

    #[test]
    fn subsets_need_identical_counts() {
        let a : OccurrenceCounter<char> = "aab".chars().collect();
        let b : OccurrenceCounter<char> = "baac".chars().collect();
        assert!(a.is_subset_of(&b));
        assert!(!b.is_subset_of(&a));
        let c : OccurrenceCounter<char> = "abb".chars().collect();
        assert!(!a.is_subset_of(&c));
        assert!(a.clone().is_same_as(&a));
        assert_ne!(a,b);
    }

    #[test]
    fn removal_and_positions() {
        let mut c : OccurrenceCounter<&str> = vec!["x","y","y","z"].into();
        assert_eq!(Some(("y",2)),c.remove_and_return(&"y"));
        assert_eq!(None,c.remove_and_return(&"y"));
        assert_eq!(Some(&"z"),c.get(1));
        assert_eq!(Some(1),c.count_at(1));
        assert_eq!(Err(CounterError::IndexOutOfBounds{index:2,len:2}),c.entry(2));
        assert_eq!(Err(CounterError::DuplicateValue(1)),c.set_at(0,"z",3));
        assert_eq!(Ok(("x",1)),c.set_at(0,"w",3));
        assert_eq!(Ok(("w",3)),c.remove_at(0));
        assert!(c.remove_at(5).is_err());
        assert_eq!(1,c.highest_individual_count());
        assert_eq!(Some(1),c.lowest_individual_count());
    }

    #[test]
    fn display_lists_counts() {
        let c : OccurrenceCounter<&str> = vec!["opt1","opt0","opt1"].into();
        assert_eq!("\n2 x opt1\n1 x opt0",c.to_string());
        assert_eq!("",OccurrenceCounter::<u8>::new().to_string());
    }

    #[test]
    fn add_all_reports_any_new() {
        let mut c : OccurrenceCounter<u8> = vec![1,2].into();
        assert!(!c.add_all(vec![1,2,2]));
        assert!(c.add_all(vec![1,5]));
        assert_eq!(3,c.count(&2));
    }
}
