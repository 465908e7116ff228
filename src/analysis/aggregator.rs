//! Score aggregation and ranking.
//!
//! Pure functions over a dataset snapshot. Every query over an empty score
//! set returns [`RecordError::NoData`] instead of a zero or NaN average.

use crate::error::RecordError;
use crate::models::{
    Dataset, Extremes, LeaderboardEntry, Score, Student, StudentId, StudentReport, SubjectAverage,
    SubjectScore, TopScorer,
};
use std::collections::BTreeMap;

fn mean(sum: u64, count: usize) -> f64 {
    sum as f64 / count as f64
}

/// Average of all of a student's scores.
pub fn per_student_average(student: &Student) -> Result<f64, RecordError> {
    if !student.has_scores() {
        return Err(RecordError::NoData);
    }

    let sum: u64 = student.scores.values().map(|s| u64::from(*s)).sum();
    Ok(mean(sum, student.scores.len()))
}

/// Highest and lowest scoring subjects of a student.
///
/// Ties go to the subject recorded first.
pub fn per_student_extremes(student: &Student) -> Result<Extremes, RecordError> {
    let mut iter = student.scores.iter();
    let (first_subject, first_score) = iter.next().ok_or(RecordError::NoData)?;

    let mut highest = (first_subject, *first_score);
    let mut lowest = (first_subject, *first_score);

    for (subject, score) in iter {
        if *score > highest.1 {
            highest = (subject, *score);
        }
        if *score < lowest.1 {
            lowest = (subject, *score);
        }
    }

    Ok(Extremes {
        highest: SubjectScore {
            subject: highest.0.clone(),
            score: highest.1,
        },
        lowest: SubjectScore {
            subject: lowest.0.clone(),
            score: lowest.1,
        },
    })
}

/// Students ranked by average score, highest first.
///
/// Students without scores are left out. Equal averages keep identifier
/// order. `top_n` of `None` keeps every entry.
pub fn leaderboard(
    dataset: &Dataset,
    top_n: Option<usize>,
) -> Result<Vec<LeaderboardEntry>, RecordError> {
    let mut averages: Vec<(StudentId, &Student, f64)> = dataset
        .students
        .iter()
        .filter_map(|(id, student)| {
            per_student_average(student)
                .ok()
                .map(|avg| (*id, student, avg))
        })
        .collect();

    if averages.is_empty() {
        return Err(RecordError::NoData);
    }

    // sort_by is stable, so ties stay in identifier order
    averages.sort_by(|a, b| b.2.total_cmp(&a.2));

    if let Some(n) = top_n {
        averages.truncate(n);
    }

    Ok(averages
        .into_iter()
        .enumerate()
        .map(|(i, (id, student, average))| LeaderboardEntry {
            rank: i + 1,
            id,
            name: student.name.clone(),
            average,
        })
        .collect())
}

/// Average score and sample count of every subject, sorted by subject.
pub fn per_subject_average(dataset: &Dataset) -> Result<Vec<SubjectAverage>, RecordError> {
    let mut grouped: BTreeMap<&str, (u64, usize)> = BTreeMap::new();

    for student in dataset.students.values() {
        for (subject, score) in &student.scores {
            let entry = grouped.entry(subject.as_str()).or_default();
            entry.0 += u64::from(*score);
            entry.1 += 1;
        }
    }

    if grouped.is_empty() {
        return Err(RecordError::NoData);
    }

    Ok(grouped
        .into_iter()
        .map(|(subject, (sum, count))| SubjectAverage {
            subject: subject.to_string(),
            average: mean(sum, count),
            count,
        })
        .collect())
}

/// Highest scorer of every subject, sorted by subject.
///
/// Only a strictly higher score replaces the running best, so the first
/// student (in identifier order) with the top score wins.
pub fn top_scorer_per_subject(dataset: &Dataset) -> Result<Vec<TopScorer>, RecordError> {
    let mut best: BTreeMap<&str, (StudentId, &Student, Score)> = BTreeMap::new();

    for (id, student) in &dataset.students {
        for (subject, score) in &student.scores {
            let beats = best
                .get(subject.as_str())
                .map_or(true, |(_, _, best_score)| *score > *best_score);
            if beats {
                best.insert(subject.as_str(), (*id, student, *score));
            }
        }
    }

    if best.is_empty() {
        return Err(RecordError::NoData);
    }

    Ok(best
        .into_iter()
        .map(|(subject, (id, student, score))| TopScorer {
            subject: subject.to_string(),
            id,
            name: student.name.clone(),
            score,
        })
        .collect())
}

/// Average, highest and lowest score of one student.
pub fn student_report(id: StudentId, student: &Student) -> Result<StudentReport, RecordError> {
    let average = per_student_average(student)?;
    let Extremes { highest, lowest } = per_student_extremes(student)?;

    Ok(StudentReport {
        id,
        name: student.name.clone(),
        subject_count: student.scores.len(),
        average,
        highest,
        lowest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str, scores: &[(&str, Score)]) -> Student {
        let mut s = Student::new(name);
        for (subject, score) in scores {
            s.scores.insert(subject.to_string(), *score);
        }
        s
    }

    fn dataset(students: Vec<(StudentId, Student)>) -> Dataset {
        let mut data = Dataset::seeded(101);
        for (id, s) in students {
            data.students.insert(id, s);
            data.next_id = data.next_id.max(id + 1);
        }
        data
    }

    fn alice_and_bob() -> Dataset {
        dataset(vec![
            (101, student("Alice", &[("Math", 8), ("English", 6)])),
            (102, student("Bob", &[("Math", 9)])),
        ])
    }

    #[test]
    fn test_per_student_average() {
        let s = student("Alice", &[("Math", 8), ("English", 6), ("Art", 7)]);
        assert_eq!(per_student_average(&s).unwrap(), 7.0);
    }

    #[test]
    fn test_per_student_average_no_data() {
        assert_eq!(
            per_student_average(&Student::new("Empty")),
            Err(RecordError::NoData)
        );
    }

    #[test]
    fn test_extremes_first_encountered_wins_ties() {
        let s = student(
            "Carol",
            &[("Art", 9), ("Math", 3), ("Music", 9), ("History", 3)],
        );
        let extremes = per_student_extremes(&s).unwrap();

        assert_eq!(extremes.highest.subject, "Art");
        assert_eq!(extremes.highest.score, 9);
        assert_eq!(extremes.lowest.subject, "Math");
        assert_eq!(extremes.lowest.score, 3);
    }

    #[test]
    fn test_extremes_single_subject() {
        let s = student("Dan", &[("Math", 4)]);
        let extremes = per_student_extremes(&s).unwrap();
        assert_eq!(extremes.highest, extremes.lowest);
    }

    #[test]
    fn test_leaderboard_orders_by_average() {
        let board = leaderboard(&alice_and_bob(), None).unwrap();

        assert_eq!(board.len(), 2);
        assert_eq!((board[0].rank, board[0].id, board[0].name.as_str()), (1, 102, "Bob"));
        assert_eq!(board[0].average, 9.0);
        assert_eq!((board[1].rank, board[1].id, board[1].name.as_str()), (2, 101, "Alice"));
        assert_eq!(board[1].average, 7.0);
    }

    #[test]
    fn test_leaderboard_excludes_students_without_scores() {
        let mut data = alice_and_bob();
        data.students.insert(103, Student::new("Nobody"));

        let board = leaderboard(&data, None).unwrap();
        assert!(board.iter().all(|e| e.id != 103));
    }

    #[test]
    fn test_leaderboard_ties_keep_identifier_order() {
        let data = dataset(vec![
            (101, student("Zed", &[("Math", 6)])),
            (102, student("Amy", &[("Math", 9)])),
            (103, student("Bea", &[("Art", 6)])),
            (104, student("Cal", &[("Art", 5), ("Math", 7)])),
        ]);

        let ids: Vec<StudentId> = leaderboard(&data, None)
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![102, 101, 103, 104]);
    }

    #[test]
    fn test_leaderboard_top_n() {
        let board = leaderboard(&alice_and_bob(), Some(1)).unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].id, 102);
    }

    #[test]
    fn test_leaderboard_no_data() {
        assert_eq!(
            leaderboard(&Dataset::seeded(101), None),
            Err(RecordError::NoData)
        );

        let data = dataset(vec![(101, Student::new("Empty"))]);
        assert_eq!(leaderboard(&data, Some(10)), Err(RecordError::NoData));
    }

    #[test]
    fn test_leaderboard_is_sorted_descending() {
        let data = dataset(vec![
            (101, student("A", &[("Math", 3), ("Art", 4)])),
            (102, student("B", &[("Math", 10)])),
            (103, student("C", &[])),
            (104, student("D", &[("Art", 7), ("Music", 8), ("Math", 2)])),
            (105, student("E", &[("Art", 0)])),
        ]);

        let board = leaderboard(&data, None).unwrap();
        assert_eq!(board.len(), 4);
        assert!(board.windows(2).all(|w| w[0].average >= w[1].average));
        assert!(board.iter().enumerate().all(|(i, e)| e.rank == i + 1));
    }

    #[test]
    fn test_per_subject_average() {
        let stats = per_subject_average(&alice_and_bob()).unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].subject, "English");
        assert_eq!(stats[0].average, 6.0);
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[1].subject, "Math");
        assert_eq!(stats[1].average, 8.5);
        assert_eq!(stats[1].count, 2);
    }

    #[test]
    fn test_per_subject_average_no_data() {
        let data = dataset(vec![(101, Student::new("Empty"))]);
        assert_eq!(per_subject_average(&data), Err(RecordError::NoData));
    }

    #[test]
    fn test_top_scorer_per_subject() {
        let top = top_scorer_per_subject(&alice_and_bob()).unwrap();

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].subject, "English");
        assert_eq!(top[0].name, "Alice");
        assert_eq!(top[1].subject, "Math");
        assert_eq!(top[1].name, "Bob");
        assert_eq!(top[1].score, 9);
    }

    #[test]
    fn test_top_scorer_first_seen_wins_ties() {
        let data = dataset(vec![
            (101, student("Alice", &[("Math", 7)])),
            (102, student("Bob", &[("Math", 9)])),
            (103, student("Carol", &[("Math", 9)])),
        ]);

        let top = top_scorer_per_subject(&data).unwrap();
        assert_eq!(top[0].id, 102);
    }

    #[test]
    fn test_top_scorer_never_below_max() {
        let data = dataset(vec![
            (101, student("A", &[("Math", 0), ("Art", 5)])),
            (102, student("B", &[("Math", 0)])),
            (103, student("C", &[("Art", 6), ("Music", 1)])),
        ]);

        for top in top_scorer_per_subject(&data).unwrap() {
            let max = data
                .students
                .values()
                .filter_map(|s| s.scores.get(&top.subject))
                .max()
                .copied()
                .unwrap();
            assert_eq!(top.score, max);
        }
        // a zero score still produces a top scorer
        let math = top_scorer_per_subject(&data)
            .unwrap()
            .into_iter()
            .find(|t| t.subject == "Math")
            .unwrap();
        assert_eq!(math.id, 101);
    }

    #[test]
    fn test_student_report() {
        let s = student("Alice", &[("Math", 8), ("English", 6)]);
        let report = student_report(101, &s).unwrap();

        assert_eq!(report.name, "Alice");
        assert_eq!(report.subject_count, 2);
        assert_eq!(report.average, 7.0);
        assert_eq!(report.highest.subject, "Math");
        assert_eq!(report.lowest.subject, "English");
    }

    #[test]
    fn test_student_report_no_data() {
        assert_eq!(
            student_report(101, &Student::new("Empty")),
            Err(RecordError::NoData)
        );
    }
}
